use rusqlite::Connection;

use crate::dates;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingChanges, BookingDetail, NewBooking, Role, Status, User};
use crate::services::{pricing, workflow};

/// Looks a customer up by phone number, registering them when unknown.
pub fn find_or_create_customer(
    conn: &Connection,
    phone: &str,
    full_name: Option<&str>,
) -> Result<User, AppError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(AppError::BadRequest("phoneNumber is required".to_string()));
    }

    if let Some(user) = queries::find_user_by_phone(conn, phone)? {
        return Ok(user);
    }

    let id = queries::insert_user(conn, full_name, phone, None, Role::Customer)?;
    tracing::info!(user_id = id, "registered new customer");
    queries::get_user(conn, id)?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("customer {id} vanished after insert")))
}

fn check_employee(conn: &Connection, employee_id: i64) -> Result<(), AppError> {
    match queries::get_user(conn, employee_id)? {
        Some(user) if matches!(user.role, Role::Employee | Role::Admin) => Ok(()),
        Some(_) => Err(AppError::BadRequest(format!(
            "user {employee_id} is not an employee"
        ))),
        None => Err(AppError::BadRequest(format!("unknown employee: {employee_id}"))),
    }
}

fn parse_appointment(raw: &str) -> Result<chrono::NaiveDateTime, AppError> {
    dates::parse_input(raw)
        .ok_or_else(|| AppError::BadRequest("appointmentDate must be a valid date".to_string()))
}

/// Inserts a pending booking and its service links on `conn`, which the
/// caller is expected to have wrapped in a transaction.
pub(crate) fn insert_new_booking(conn: &Connection, input: &NewBooking) -> Result<Booking, AppError> {
    if input.service_ids.is_empty() {
        return Err(AppError::BadRequest(
            "at least one service must be selected".to_string(),
        ));
    }
    let appointment_date = parse_appointment(&input.appointment_date)?;
    if let Some(employee_id) = input.employee_id {
        check_employee(conn, employee_id)?;
    }

    let customer = find_or_create_customer(conn, &input.phone_number, input.full_name.as_deref())?;
    let services = pricing::resolve_services(conn, &input.service_ids)?;
    let service_ids: Vec<i64> = services.iter().map(|s| s.id).collect();

    let now = dates::now();
    let mut booking = Booking {
        id: 0,
        customer_id: customer.id,
        employee_id: input.employee_id,
        appointment_date,
        status: Status::Pending,
        total_price: pricing::total_price(&services),
        notes: input.notes.clone(),
        created_at: now,
        updated_at: now,
    };
    booking.id = queries::insert_booking(conn, &booking)?;
    queries::replace_booking_services(conn, booking.id, &service_ids)?;

    tracing::info!(
        booking_id = booking.id,
        customer_id = customer.id,
        services = service_ids.len(),
        total_price = booking.total_price,
        "booking created"
    );
    Ok(booking)
}

pub fn create_booking(conn: &mut Connection, input: &NewBooking) -> Result<BookingDetail, AppError> {
    let tx = conn.transaction()?;
    let booking = insert_new_booking(&tx, input)?;
    let detail = queries::expand_booking(&tx, booking)?;
    tx.commit()?;
    Ok(detail)
}

/// Applies a partial update. A new service selection replaces the old one
/// and recomputes the total; everything happens in one transaction, so a
/// failure leaves the booking as it was.
pub fn update_booking(
    conn: &mut Connection,
    id: i64,
    changes: &BookingChanges,
    strict: bool,
) -> Result<BookingDetail, AppError> {
    let tx = conn.transaction()?;

    let mut booking = queries::get_booking(&tx, id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;
    let now = dates::now();

    if let Some(phone) = changes.phone_number.as_deref() {
        booking.customer_id = find_or_create_customer(&tx, phone, changes.full_name.as_deref())?.id;
    }
    if let Some(raw) = changes.appointment_date.as_deref() {
        booking.appointment_date = parse_appointment(raw)?;
    }
    if let Some(notes) = &changes.notes {
        booking.notes = Some(notes.clone());
    }
    if let Some(employee_id) = changes.employee_id {
        check_employee(&tx, employee_id)?;
        booking.employee_id = Some(employee_id);
    }
    if let Some(service_ids) = &changes.service_ids {
        let services = pricing::resolve_services(&tx, service_ids)?;
        let ids: Vec<i64> = services.iter().map(|s| s.id).collect();
        queries::replace_booking_services(&tx, id, &ids)?;
        booking.total_price = pricing::total_price(&services);
        tracing::info!(booking_id = id, services = ids.len(), total_price = booking.total_price, "booking services replaced");
    }
    if let Some(next) = changes.status {
        workflow::on_booking_status_change(&tx, id, booking.status, next, strict, &now)?;
        booking.status = next;
    }

    booking.updated_at = now;
    queries::update_booking(&tx, &booking)?;
    let detail = queries::expand_booking(&tx, booking)?;
    tx.commit()?;

    Ok(detail)
}

pub fn delete_booking(conn: &Connection, id: i64) -> Result<(), AppError> {
    if !queries::delete_booking(conn, id)? {
        return Err(AppError::NotFound(format!("booking {id}")));
    }
    tracing::info!(booking_id = id, "booking deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::NewService;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
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

    fn new_booking(service_ids: Vec<i64>) -> NewBooking {
        NewBooking {
            phone_number: "0901234567".to_string(),
            full_name: Some("Binh".to_string()),
            appointment_date: "2025-06-15T14:00:00".to_string(),
            service_ids,
            notes: Some("short on the sides".to_string()),
            employee_id: None,
        }
    }

    #[test]
    fn test_create_computes_total_and_links_services() {
        let mut conn = setup_db();
        let cut = seed_service(&conn, "Cut", 100_000.0);
        let wash = seed_service(&conn, "Wash", 150_000.0);

        let detail = create_booking(&mut conn, &new_booking(vec![cut, wash])).unwrap();

        assert_eq!(detail.booking.total_price, 250_000.0);
        assert_eq!(detail.booking.status, Status::Pending);
        assert_eq!(detail.services.len(), 2);
        assert_eq!(detail.customer.unwrap().phone, "0901234567");
    }

    #[test]
    fn test_create_reuses_customer_by_phone() {
        let mut conn = setup_db();
        let cut = seed_service(&conn, "Cut", 100_000.0);

        let first = create_booking(&mut conn, &new_booking(vec![cut])).unwrap();
        let second = create_booking(&mut conn, &new_booking(vec![cut])).unwrap();

        assert_eq!(first.booking.customer_id, second.booking.customer_id);
    }

    #[test]
    fn test_create_requires_a_service() {
        let mut conn = setup_db();
        let err = create_booking(&mut conn, &new_booking(vec![])).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_create_with_unknown_service_leaves_nothing_behind() {
        let mut conn = setup_db();
        let cut = seed_service(&conn, "Cut", 100_000.0);

        let err = create_booking(&mut conn, &new_booking(vec![cut, 77])).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        assert!(queries::find_user_by_phone(&conn, "0901234567").unwrap().is_none());
        let bookings: i64 = conn
            .query_row("SELECT COUNT(*) FROM bookings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(bookings, 0);
    }

    #[test]
    fn test_create_rejects_bad_date() {
        let mut conn = setup_db();
        let cut = seed_service(&conn, "Cut", 100_000.0);
        let mut input = new_booking(vec![cut]);
        input.appointment_date = "next tuesday".to_string();
        assert!(matches!(
            create_booking(&mut conn, &input),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_replacing_services_recomputes_total() {
        let mut conn = setup_db();
        let cut = seed_service(&conn, "Cut", 100_000.0);
        let wash = seed_service(&conn, "Wash", 150_000.0);
        let dye = seed_service(&conn, "Dye", 400_000.0);
        let booking = create_booking(&mut conn, &new_booking(vec![cut, wash])).unwrap().booking;

        let changes = BookingChanges {
            service_ids: Some(vec![dye]),
            ..Default::default()
        };
        let detail = update_booking(&mut conn, booking.id, &changes, false).unwrap();

        assert_eq!(detail.booking.total_price, 400_000.0);
        assert_eq!(detail.services.len(), 1);
        assert_eq!(detail.services[0].id, dye);
    }

    #[test]
    fn test_update_without_services_keeps_stored_total() {
        let mut conn = setup_db();
        let cut = seed_service(&conn, "Cut", 100_000.0);
        let booking = create_booking(&mut conn, &new_booking(vec![cut])).unwrap().booking;

        conn.execute("UPDATE services SET price = 999 WHERE id = ?1", [cut]).unwrap();

        let changes = BookingChanges {
            notes: Some("fringe too".to_string()),
            ..Default::default()
        };
        let detail = update_booking(&mut conn, booking.id, &changes, false).unwrap();
        assert_eq!(detail.booking.total_price, 100_000.0);
        assert_eq!(detail.booking.notes.as_deref(), Some("fringe too"));
    }

    #[test]
    fn test_empty_replacement_zeroes_total() {
        let mut conn = setup_db();
        let cut = seed_service(&conn, "Cut", 100_000.0);
        let booking = create_booking(&mut conn, &new_booking(vec![cut])).unwrap().booking;

        let changes = BookingChanges {
            service_ids: Some(vec![]),
            ..Default::default()
        };
        let detail = update_booking(&mut conn, booking.id, &changes, false).unwrap();
        assert_eq!(detail.booking.total_price, 0.0);
        assert!(detail.services.is_empty());
    }

    #[test]
    fn test_failed_replacement_rolls_back() {
        let mut conn = setup_db();
        let cut = seed_service(&conn, "Cut", 100_000.0);
        let wash = seed_service(&conn, "Wash", 150_000.0);
        let booking = create_booking(&mut conn, &new_booking(vec![cut, wash])).unwrap().booking;

        let changes = BookingChanges {
            service_ids: Some(vec![cut, 404]),
            ..Default::default()
        };
        assert!(update_booking(&mut conn, booking.id, &changes, false).is_err());

        let detail = queries::get_booking_detail(&conn, booking.id).unwrap().unwrap();
        assert_eq!(detail.booking.total_price, 250_000.0);
        assert_eq!(detail.services.len(), 2);
    }

    #[test]
    fn test_employee_must_have_staff_role() {
        let mut conn = setup_db();
        let cut = seed_service(&conn, "Cut", 100_000.0);
        let customer = queries::insert_user(&conn, None, "0909000000", None, Role::Customer).unwrap();
        let stylist =
            queries::insert_user(&conn, Some("Chi"), "0909000001", None, Role::Employee).unwrap();

        let mut input = new_booking(vec![cut]);
        input.employee_id = Some(customer);
        assert!(matches!(
            create_booking(&mut conn, &input),
            Err(AppError::BadRequest(_))
        ));

        input.employee_id = Some(stylist);
        let detail = create_booking(&mut conn, &input).unwrap();
        assert_eq!(detail.employee.unwrap().id, stylist);
    }

    #[test]
    fn test_delete_missing_booking() {
        let conn = setup_db();
        assert!(matches!(delete_booking(&conn, 5), Err(AppError::NotFound(_))));
    }
}
