use serde::{Deserialize, Serialize};

// =========================================================
// Near-Earth object types
// =========================================================

/// Canonical near-Earth object record, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearEarthObject {
    pub id: String,
    pub name: String,
    /// Maximum estimated diameter in kilometres.
    pub diameter: f64,
    /// Relative velocity at first close approach, km/h.
    pub velocity: f64,
    /// `YYYY-MM-DD` of the first close approach, empty when unknown.
    pub close_approach_date: String,
    pub is_potentially_hazardous: bool,
}

/// Response body of `GET /api/neo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeoPage {
    pub data: Vec<NearEarthObject>,
    /// Size of the hazardous-filtered set before pagination.
    pub total: usize,
    pub page: u32,
    pub limit: u32,
}

/// Route path for the near-Earth object feed
pub const GET_NEOS: &str = "/api/neo";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neo_page_round_trips_wire_names() {
        let raw = r#"{
            "data": [{
                "id": "3542519",
                "name": "(2010 PK9)",
                "diameter": 0.32,
                "velocity": 61234.5,
                "closeApproachDate": "2024-01-01",
                "isPotentiallyHazardous": true
            }],
            "total": 1,
            "page": 1,
            "limit": 10
        }"#;
        let page: NeoPage = serde_json::from_str(raw).unwrap();
        assert_eq!(page.data[0].close_approach_date, "2024-01-01");
        assert!(page.data[0].is_potentially_hazardous);
        assert_eq!(page.limit, 10);
    }
}
