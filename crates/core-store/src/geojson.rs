use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use core_schema::StatusTable;

/// One GeoJSON feature. Geometry stays an opaque `Value`; the store never
/// interprets coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub feature_type: String,
    #[serde(default)]
    pub geometry: Value,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub collection_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<Value>,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    #[must_use]
    pub fn is_feature_collection(&self) -> bool {
        self.collection_type == "FeatureCollection"
    }

    /// Flatten features into an attribute table with geometry riding
    /// alongside each row.
    #[must_use]
    pub fn to_table(&self) -> StatusTable {
        let records = self
            .features
            .iter()
            .map(|feature| feature.properties.clone())
            .collect();
        let mut table = StatusTable::from_objects(records);
        table.set_geometry(
            self.features
                .iter()
                .map(|feature| feature.geometry.clone())
                .collect(),
        );
        table
    }

    /// Rebuild a collection from a table, pairing each row with its geometry
    /// (null geometry when the table carries none).
    #[must_use]
    pub fn from_table(table: &StatusTable, name: Option<String>, crs: Option<Value>) -> Self {
        let records = table.to_records();
        let features = records
            .into_iter()
            .enumerate()
            .map(|(index, properties)| Feature {
                feature_type: "Feature".to_string(),
                geometry: table
                    .geometry()
                    .and_then(|g| g.get(index).cloned())
                    .unwrap_or(Value::Null),
                properties,
            })
            .collect();
        Self {
            collection_type: "FeatureCollection".to_string(),
            name,
            crs,
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_collection() -> FeatureCollection {
        serde_json::from_value(json!({
            "type": "FeatureCollection",
            "name": "IA_BLE_Tracking",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]},
                    "properties": {"HUC8": "07080101", "Name": "Turkey"}
                },
                {
                    "type": "Feature",
                    "geometry": null,
                    "properties": {"HUC8": "07060004", "Name": "Maquoketa"}
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn collection_round_trips_through_table() {
        let collection = sample_collection();
        let table = collection.to_table();
        assert_eq!(table.columns(), ["HUC8", "Name"]);
        assert_eq!(table.len(), 2);
        assert!(table.geometry().unwrap()[0].is_object());

        let rebuilt =
            FeatureCollection::from_table(&table, collection.name.clone(), collection.crs.clone());
        assert_eq!(rebuilt, collection);
    }
}
