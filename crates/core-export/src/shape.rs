use std::path::Path;

use serde_json::Value;
use snafu::ResultExt;

use core_schema::{ColumnType, Metadata, StatusTable, TableFormat};

use crate::error::{self, Result};

/// Write the table as an ESRI Shapefile. Columns must already be in the
/// shapefile dialect (names are 10 characters or fewer by metadata
/// construction); `metadata` supplies declared types so numeric columns
/// become numeric dBASE fields. Rows whose geometry is not a GeoJSON
/// Polygon/MultiPolygon are skipped with a warning, never a failure.
/// Returns the number of features written.
pub fn write_shapefile(table: &StatusTable, metadata: &Metadata, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context(error::CreateDirectorySnafu {
            path: parent.display().to_string(),
        })?;
    }
    let display = path.display().to_string();

    let numeric: std::collections::HashSet<&str> = metadata
        .columns
        .values()
        .filter(|spec| spec.column_type() == Some(ColumnType::Numeric))
        .filter_map(|spec| spec.display_name(TableFormat::Shapefile))
        .collect();

    let mut builder = shapefile::dbase::TableWriterBuilder::new();
    for column in table.columns() {
        let name = shapefile::dbase::FieldName::try_from(column.as_str())
            .map_err(|_| error::FieldNameSnafu { name: column.clone() }.build())?;
        if numeric.contains(column.as_str()) {
            builder = builder.add_numeric_field(name, 18, 6);
        } else {
            builder = builder.add_character_field(name, 254);
        }
    }

    let mut writer = shapefile::Writer::from_path(path, builder)
        .context(error::WriteShapefileSnafu {
            path: display.clone(),
        })?;

    let mut written = 0;
    for (index, row) in table.rows().iter().enumerate() {
        let geometry = table.geometry().and_then(|g| g.get(index));
        let Some(polygon) = geometry.and_then(polygon_from_geojson) else {
            tracing::warn!(row = index, "row without polygon geometry skipped");
            continue;
        };

        let mut record = shapefile::dbase::Record::default();
        for (column, cell) in table.columns().iter().zip(row) {
            let field = if numeric.contains(column.as_str()) {
                shapefile::dbase::FieldValue::Numeric(cell.as_f64())
            } else {
                shapefile::dbase::FieldValue::Character(character_value(cell))
            };
            record.insert(column.clone(), field);
        }
        writer
            .write_shape_and_record(&polygon, &record)
            .context(error::WriteShapefileSnafu {
                path: display.clone(),
            })?;
        written += 1;
    }
    Ok(written)
}

fn character_value(cell: &Value) -> Option<String> {
    match cell {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Convert GeoJSON Polygon/MultiPolygon coordinates into a shapefile
/// polygon. First ring of each polygon is the outer ring, the rest are
/// holes; the shapefile crate closes rings and fixes winding itself.
fn polygon_from_geojson(geometry: &Value) -> Option<shapefile::Polygon> {
    let kind = geometry.get("type")?.as_str()?;
    let coordinates = geometry.get("coordinates")?;

    let mut rings: Vec<shapefile::PolygonRing<shapefile::Point>> = Vec::new();
    match kind {
        "Polygon" => collect_rings(coordinates, &mut rings)?,
        "MultiPolygon" => {
            for polygon in coordinates.as_array()? {
                collect_rings(polygon, &mut rings)?;
            }
        }
        _ => return None,
    }
    if rings.is_empty() {
        return None;
    }
    Some(shapefile::Polygon::with_rings(rings))
}

fn collect_rings(
    polygon: &Value,
    rings: &mut Vec<shapefile::PolygonRing<shapefile::Point>>,
) -> Option<()> {
    for (index, ring) in polygon.as_array()?.iter().enumerate() {
        let points: Vec<shapefile::Point> = ring
            .as_array()?
            .iter()
            .filter_map(point_from_position)
            .collect();
        if points.len() < 3 {
            return None;
        }
        if index == 0 {
            rings.push(shapefile::PolygonRing::Outer(points));
        } else {
            rings.push(shapefile::PolygonRing::Inner(points));
        }
    }
    Some(())
}

fn point_from_position(position: &Value) -> Option<shapefile::Point> {
    let pair = position.as_array()?;
    Some(shapefile::Point::new(
        pair.first()?.as_f64()?,
        pair.get(1)?.as_f64()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shapefile_metadata() -> Metadata {
        serde_json::from_value(json!({
            "columns": {
                "HUC8": {"shapefile": "HUC8", "dtype": "string"},
                "Name": {"shapefile": "Name", "dtype": "string"},
                "FRP_Perc_Complete": {"shapefile": "FRP_Perc", "dtype": "numeric"}
            },
            "sort_order": []
        }))
        .unwrap()
    }

    fn square(origin: f64) -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[
                [origin, origin], [origin + 1.0, origin],
                [origin + 1.0, origin + 1.0], [origin, origin + 1.0],
                [origin, origin]
            ]]
        })
    }

    #[test]
    fn writes_polygons_and_typed_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IA_BLE_Tracking.shp");

        let mut table = StatusTable::from_records(&json!([
            {"HUC8": "07080101", "Name": "Turkey", "FRP_Perc": 40.0},
            {"HUC8": "07060004", "Name": "Maquoketa", "FRP_Perc": 12.5}
        ]))
        .unwrap();
        table.set_geometry(vec![square(0.0), square(5.0)]);

        let written = write_shapefile(&table, &shapefile_metadata(), &path).unwrap();
        assert_eq!(written, 2);

        let back =
            shapefile::read_as::<_, shapefile::Polygon, shapefile::dbase::Record>(&path).unwrap();
        assert_eq!(back.len(), 2);
        let (_, record) = &back[0];
        match record.get("HUC8") {
            Some(shapefile::dbase::FieldValue::Character(Some(huc8))) => {
                assert_eq!(huc8.trim(), "07080101");
            }
            other => panic!("unexpected HUC8 field: {other:?}"),
        }
        match record.get("FRP_Perc") {
            Some(shapefile::dbase::FieldValue::Numeric(Some(percent))) => {
                assert!((percent - 40.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected FRP_Perc field: {other:?}"),
        }
    }

    #[test]
    fn rows_without_polygon_geometry_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.shp");

        let mut table = StatusTable::from_records(&json!([
            {"HUC8": "07080101"},
            {"HUC8": "07060004"}
        ]))
        .unwrap();
        table.set_geometry(vec![square(0.0), Value::Null]);

        let written = write_shapefile(&table, &shapefile_metadata(), &path).unwrap();
        assert_eq!(written, 1);
    }
}
