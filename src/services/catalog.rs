use rusqlite::Connection;

use crate::dates;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{NewService, ServiceChanges, ServiceDetail};

fn validate(name: &str, price: f64, estimated_time: i64) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("serviceName is required".to_string()));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::BadRequest("price must be a non-negative number".to_string()));
    }
    if estimated_time < 0 {
        return Err(AppError::BadRequest("estimatedTime must not be negative".to_string()));
    }
    Ok(())
}

pub fn load_service(conn: &Connection, id: i64) -> Result<ServiceDetail, AppError> {
    let service = queries::get_service(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("service {id}")))?;
    let steps = queries::get_service_steps(conn, id)?;
    Ok(ServiceDetail { service, steps })
}

pub fn create_service(conn: &mut Connection, input: &NewService) -> Result<ServiceDetail, AppError> {
    validate(&input.service_name, input.price, input.estimated_time.unwrap_or(0))?;

    let tx = conn.transaction()?;
    let id = queries::insert_service(&tx, input)?;
    queries::replace_service_steps(&tx, id, &input.steps)?;
    let detail = load_service(&tx, id)?;
    tx.commit()?;

    tracing::info!(service_id = id, price = input.price, "service created");
    Ok(detail)
}

/// Price changes only affect bookings whose selection is replaced later;
/// stored booking totals are never rewritten here.
pub fn update_service(
    conn: &mut Connection,
    id: i64,
    changes: &ServiceChanges,
) -> Result<ServiceDetail, AppError> {
    let tx = conn.transaction()?;

    let mut service = queries::get_service(&tx, id)?
        .ok_or_else(|| AppError::NotFound(format!("service {id}")))?;
    if let Some(name) = &changes.service_name {
        service.service_name = name.clone();
    }
    if let Some(price) = changes.price {
        service.price = price;
    }
    if let Some(minutes) = changes.estimated_time {
        service.estimated_time = minutes;
    }
    if let Some(description) = &changes.description {
        service.description = Some(description.clone());
    }
    if let Some(url) = &changes.banner_image_url {
        service.banner_image_url = Some(url.clone());
    }
    validate(&service.service_name, service.price, service.estimated_time)?;

    service.updated_at = dates::now();
    queries::update_service(&tx, &service)?;
    if let Some(steps) = &changes.steps {
        queries::replace_service_steps(&tx, id, steps)?;
    }
    let detail = load_service(&tx, id)?;
    tx.commit()?;

    tracing::info!(service_id = id, "service updated");
    Ok(detail)
}

pub fn delete_service(conn: &Connection, id: i64) -> Result<(), AppError> {
    if queries::service_in_use(conn, id)? {
        return Err(AppError::Conflict(format!(
            "service {id} is selected by existing bookings"
        )));
    }
    if !queries::delete_service(conn, id)? {
        return Err(AppError::NotFound(format!("service {id}")));
    }
    tracing::info!(service_id = id, "service deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{NewBooking, StepInput};
    use crate::services::bookings;

    fn step(title: &str) -> StepInput {
        StepInput {
            step_title: title.to_string(),
            step_description: None,
            step_image_url: None,
        }
    }

    fn new_service(price: f64) -> NewService {
        NewService {
            service_name: "Cut".to_string(),
            price,
            estimated_time: Some(45),
            description: None,
            banner_image_url: None,
            steps: vec![step("Wash"), step("Cut")],
        }
    }

    #[test]
    fn test_create_with_steps() {
        let mut conn = db::init_db(":memory:").unwrap();
        let detail = create_service(&mut conn, &new_service(100_000.0)).unwrap();
        assert_eq!(detail.steps.len(), 2);
        assert_eq!(detail.steps[1].step_order, 2);
        assert_eq!(detail.steps[1].step_title, "Cut");
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut conn = db::init_db(":memory:").unwrap();
        assert!(matches!(
            create_service(&mut conn, &new_service(-1.0)),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_update_replaces_steps_only_when_given() {
        let mut conn = db::init_db(":memory:").unwrap();
        let id = create_service(&mut conn, &new_service(100_000.0)).unwrap().service.id;

        let detail = update_service(
            &mut conn,
            id,
            &ServiceChanges {
                price: Some(120_000.0),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(detail.service.price, 120_000.0);
        assert_eq!(detail.steps.len(), 2);

        let detail = update_service(
            &mut conn,
            id,
            &ServiceChanges {
                steps: Some(vec![step("Style")]),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(detail.steps.len(), 1);
        assert_eq!(detail.steps[0].step_title, "Style");
    }

    #[test]
    fn test_service_in_use_cannot_be_deleted() {
        let mut conn = db::init_db(":memory:").unwrap();
        let id = create_service(&mut conn, &new_service(100_000.0)).unwrap().service.id;
        bookings::create_booking(
            &mut conn,
            &NewBooking {
                phone_number: "0900000000".to_string(),
                full_name: None,
                appointment_date: "2025-07-01".to_string(),
                service_ids: vec![id],
                notes: None,
                employee_id: None,
            },
        )
        .unwrap();

        assert!(matches!(delete_service(&conn, id), Err(AppError::Conflict(_))));
    }
}
