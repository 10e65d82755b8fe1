use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Service;

/// Sorted, de-duplicated copy of the requested ids. Every id must be positive.
pub fn normalize_service_ids(ids: &[i64]) -> Result<Vec<i64>, AppError> {
    if let Some(bad) = ids.iter().find(|id| **id <= 0) {
        return Err(AppError::BadRequest(format!("invalid service id: {bad}")));
    }
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

/// Plain sum of current prices; an empty selection costs nothing.
pub fn total_price(services: &[Service]) -> f64 {
    services.iter().map(|s| s.price).sum()
}

/// Loads the selected services, rejecting the whole selection if any id is
/// unknown.
pub fn resolve_services(conn: &Connection, ids: &[i64]) -> Result<Vec<Service>, AppError> {
    let ids = normalize_service_ids(ids)?;
    let services = queries::get_services_by_ids(conn, &ids)?;

    if services.len() != ids.len() {
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !services.iter().any(|s| s.id == **id))
            .map(|id| id.to_string())
            .collect();
        return Err(AppError::BadRequest(format!(
            "unknown service id(s): {}",
            missing.join(", ")
        )));
    }

    Ok(services)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::NewService;
    use proptest::prelude::*;

    fn service(id: i64, price: f64) -> Service {
        let now = crate::dates::now();
        Service {
            id,
            service_name: format!("service-{id}"),
            price,
            estimated_time: 30,
            description: None,
            banner_image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn seed_service(conn: &Connection, name: &str, price: f64) -> i64 {
        queries::insert_service(
            conn,
            &NewService {
                service_name: name.to_string(),
                price,
                estimated_time: Some(30),
                description: None,
                banner_image_url: None,
                steps: vec![],
            },
        )
        .unwrap()
    }

    #[test]
    fn test_total_of_two_services() {
        let services = vec![service(1, 100_000.0), service(2, 150_000.0)];
        assert_eq!(total_price(&services), 250_000.0);
    }

    #[test]
    fn test_empty_selection_is_free() {
        assert_eq!(total_price(&[]), 0.0);
    }

    #[test]
    fn test_normalize_dedups_and_sorts() {
        assert_eq!(normalize_service_ids(&[3, 1, 3, 2]).unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            normalize_service_ids(&[1, 0]),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_resolve_rejects_unknown_ids() {
        let conn = db::init_db(":memory:").unwrap();
        let id = seed_service(&conn, "Cut", 100_000.0);

        let err = resolve_services(&conn, &[id, 999]).unwrap_err();
        assert!(err.to_string().contains("999"));

        let services = resolve_services(&conn, &[id, id]).unwrap();
        assert_eq!(services.len(), 1);
    }

    proptest! {
        /// The total equals the sum of the current prices of the distinct
        /// services selected.
        #[test]
        fn total_matches_sum_of_selected_prices(
            prices in prop::collection::vec(0u32..5_000_000u32, 1..8),
            picks in prop::collection::vec(any::<prop::sample::Index>(), 1..12),
        ) {
            let conn = db::init_db(":memory:").unwrap();
            let ids: Vec<i64> = prices
                .iter()
                .enumerate()
                .map(|(i, p)| seed_service(&conn, &format!("svc-{i}"), *p as f64))
                .collect();

            let selected: Vec<i64> = picks.iter().map(|ix| ids[ix.index(ids.len())]).collect();
            let services = resolve_services(&conn, &selected).unwrap();

            let distinct = normalize_service_ids(&selected).unwrap();
            let expected: f64 = distinct
                .iter()
                .map(|id| prices[ids.iter().position(|x| x == id).unwrap()] as f64)
                .sum();
            prop_assert_eq!(total_price(&services), expected);
        }
    }
}
