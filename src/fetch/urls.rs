// src/fetch/urls.rs

/// Release that hosts the monthly yellow-cab trip record CSVs.
static TRIPDATA_BASE: &str =
    "https://github.com/DataTalksClub/nyc-tlc-data/releases/download/yellow";

/// Build the download URL for one month of yellow-cab trip data.
///
/// The month is zero-padded to two digits, e.g. `(2021, 1)` →
/// `.../yellow_tripdata_2021-01.csv.gz`.
pub fn tripdata_url(year: i32, month: u32) -> String {
    format!("{TRIPDATA_BASE}/yellow_tripdata_{year}-{month:02}.csv.gz")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_matches_release_template() {
        assert_eq!(
            tripdata_url(2021, 1),
            "https://github.com/DataTalksClub/nyc-tlc-data/releases/download/yellow/yellow_tripdata_2021-01.csv.gz"
        );
    }

    #[test]
    fn month_is_zero_padded() {
        assert!(tripdata_url(2020, 9).ends_with("yellow_tripdata_2020-09.csv.gz"));
        assert!(tripdata_url(2019, 12).ends_with("yellow_tripdata_2019-12.csv.gz"));
    }
}
