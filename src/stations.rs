/// Station registry for the Dadu River inflow tools.
///
/// Defines the default station rosters used when a request names no
/// stations, and the PMIS code registry the bias map is keyed by. This is
/// the single source of truth for station names; other modules should
/// reference rosters from here rather than hardcoding them.

// ---------------------------------------------------------------------------
// Station metadata
// ---------------------------------------------------------------------------

/// Metadata for one hydropower station.
pub struct Station {
    /// Short name used in queries, file names and table headers.
    pub name: &'static str,
    /// Reservoir name as it appears in the PMIS system.
    pub reservoir: &'static str,
    /// 8-digit PMIS code.
    pub pmis_code: &'static str,
    /// Whether the hourly probabilistic forecast is published for this station.
    pub hourly_bounds: bool,
}

/// All stations on the Dadu River, in the order of the default daily roster.
pub static STATION_REGISTRY: &[Station] = &[
    Station { name: "铜街子", reservoir: "铜街子水库", pmis_code: "15000000", hourly_bounds: false },
    Station { name: "龚嘴", reservoir: "龚嘴水库", pmis_code: "15000001", hourly_bounds: true },
    Station { name: "深溪沟", reservoir: "深溪沟水库", pmis_code: "15000003", hourly_bounds: false },
    Station { name: "大岗山", reservoir: "大岗山水库", pmis_code: "15000007", hourly_bounds: true },
    Station { name: "瀑布沟", reservoir: "瀑布沟水库", pmis_code: "15000002", hourly_bounds: true },
    Station { name: "猴子岩", reservoir: "猴子岩水库", pmis_code: "15000016", hourly_bounds: true },
    Station { name: "沙南", reservoir: "沙南水库", pmis_code: "15000017", hourly_bounds: false },
    Station { name: "枕头坝", reservoir: "枕头坝一级水库", pmis_code: "15000008", hourly_bounds: false },
];

/// Default roster for daily tools: every registered station.
pub fn default_daily_stations() -> Vec<String> {
    STATION_REGISTRY.iter().map(|s| s.name.to_string()).collect()
}

/// Default roster for hourly tools: stations with an hourly forecast.
pub fn default_hourly_stations() -> Vec<String> {
    STATION_REGISTRY
        .iter()
        .filter(|s| s.hourly_bounds)
        .map(|s| s.name.to_string())
        .collect()
}

/// Looks up a station by short name or reservoir name.
pub fn find_station(name: &str) -> Option<&'static Station> {
    STATION_REGISTRY
        .iter()
        .find(|s| s.name == name || s.reservoir == name)
}

/// PMIS code for a station name, if registered.
pub fn pmis_code(name: &str) -> Option<&'static str> {
    find_station(name).map(|s| s.pmis_code)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_pmis_codes_are_eight_digits() {
        for station in STATION_REGISTRY {
            assert_eq!(
                station.pmis_code.len(),
                8,
                "PMIS code for '{}' should be 8 digits, got '{}'",
                station.name,
                station.pmis_code
            );
            assert!(station.pmis_code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_no_duplicate_names_or_codes() {
        let mut names = std::collections::HashSet::new();
        let mut codes = std::collections::HashSet::new();
        for station in STATION_REGISTRY {
            assert!(names.insert(station.name), "duplicate name '{}'", station.name);
            assert!(codes.insert(station.pmis_code), "duplicate code '{}'", station.pmis_code);
        }
    }

    #[test]
    fn test_default_daily_roster_order() {
        assert_eq!(
            default_daily_stations(),
            vec!["铜街子", "龚嘴", "深溪沟", "大岗山", "瀑布沟", "猴子岩", "沙南", "枕头坝"]
        );
    }

    #[test]
    fn test_default_hourly_roster() {
        assert_eq!(default_hourly_stations(), vec!["龚嘴", "大岗山", "瀑布沟", "猴子岩"]);
    }

    #[test]
    fn test_find_station_by_reservoir_name() {
        assert_eq!(pmis_code("枕头坝一级水库"), Some("15000008"));
        assert_eq!(pmis_code("猴子岩"), Some("15000016"));
        assert!(find_station("三峡").is_none());
    }
}
