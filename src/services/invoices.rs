use rusqlite::Connection;

use crate::dates;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Invoice, InvoiceDetail, NewInvoice, Status};
use crate::services::bookings;

pub fn load_detail(conn: &Connection, id: i64) -> Result<InvoiceDetail, AppError> {
    let invoice = queries::get_invoice(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("invoice {id}")))?;
    expand(conn, invoice)
}

pub fn expand(conn: &Connection, invoice: Invoice) -> Result<InvoiceDetail, AppError> {
    let booking = match invoice.booking_id {
        Some(booking_id) => queries::get_booking_detail(conn, booking_id)?,
        None => None,
    };
    Ok(InvoiceDetail { invoice, booking })
}

/// Raises a pending invoice for an existing booking, or for a booking
/// created inline in the same transaction.
///
/// The amount is the booking's total; the submitted `totalAmount` only
/// applies when that total is zero.
pub fn create_invoice(
    conn: &mut Connection,
    input: &NewInvoice,
    strict: bool,
) -> Result<InvoiceDetail, AppError> {
    let invoice_date = match input.invoice_date.as_deref() {
        Some(raw) => dates::parse_input(raw)
            .ok_or_else(|| AppError::BadRequest("invoiceDate must be a valid date".to_string()))?,
        None => dates::now(),
    };
    if let Some(amount) = input.total_amount {
        if !amount.is_finite() || amount < 0.0 {
            return Err(AppError::BadRequest(
                "totalAmount must be a non-negative number".to_string(),
            ));
        }
    }

    let tx = conn.transaction()?;

    let booking = match (input.booking_id, &input.booking) {
        (Some(booking_id), _) => {
            let booking = queries::get_booking(&tx, booking_id)?
                .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;
            if strict && !matches!(booking.status, Status::Completed | Status::Success) {
                return Err(AppError::Conflict(format!(
                    "booking {} is {}, only completed bookings can be invoiced",
                    booking.id, booking.status
                )));
            }
            booking
        }
        // inline bookings are new and pending; the strict gate is for existing ones
        (None, Some(inline)) => bookings::insert_new_booking(&tx, inline)?,
        (None, None) => {
            return Err(AppError::BadRequest(
                "either bookingId or booking details must be provided".to_string(),
            ))
        }
    };

    let total_amount = if booking.total_price != 0.0 {
        booking.total_price
    } else {
        input.total_amount.unwrap_or(0.0)
    };

    let now = dates::now();
    let mut invoice = Invoice {
        id: 0,
        booking_id: Some(booking.id),
        invoice_date,
        total_amount,
        status: initial_status(booking.status),
        created_at: now,
        updated_at: now,
    };
    invoice.id = queries::insert_invoice(&tx, &invoice)?;
    let detail = expand(&tx, invoice)?;
    tx.commit()?;

    tracing::info!(
        invoice_id = detail.invoice.id,
        booking_id = booking.id,
        total_amount,
        "invoice created"
    );
    Ok(detail)
}

/// Invoices raised for an already successful booking start out successful.
fn initial_status(booking_status: Status) -> Status {
    if booking_status == Status::Success {
        Status::Success
    } else {
        Status::Pending
    }
}

pub fn delete_invoice(conn: &Connection, id: i64) -> Result<(), AppError> {
    if !queries::delete_invoice(conn, id)? {
        return Err(AppError::NotFound(format!("invoice {id}")));
    }
    tracing::info!(invoice_id = id, "invoice deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{NewBooking, NewService};

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn seed_service(conn: &Connection, price: f64) -> i64 {
        queries::insert_service(
            conn,
            &NewService {
                service_name: format!("svc-{price}"),
                price,
                estimated_time: None,
                description: None,
                banner_image_url: None,
                steps: vec![],
            },
        )
        .unwrap()
    }

    fn inline_booking(service_ids: Vec<i64>) -> NewBooking {
        NewBooking {
            phone_number: "0912000000".to_string(),
            full_name: None,
            appointment_date: "2025-05-02".to_string(),
            service_ids,
            notes: None,
            employee_id: None,
        }
    }

    #[test]
    fn test_requires_booking_reference() {
        let mut conn = setup_db();
        let err = create_invoice(&mut conn, &NewInvoice::default(), false).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_copies_booking_total() {
        let mut conn = setup_db();
        let a = seed_service(&conn, 100_000.0);
        let b = seed_service(&conn, 150_000.0);

        let detail = create_invoice(
            &mut conn,
            &NewInvoice {
                booking: Some(inline_booking(vec![a, b])),
                total_amount: Some(1.0),
                ..Default::default()
            },
            false,
        )
        .unwrap();

        assert_eq!(detail.invoice.total_amount, 250_000.0);
        assert_eq!(detail.invoice.status, Status::Pending);
        let booking = detail.booking.unwrap();
        assert_eq!(booking.services.len(), 2);
        assert_eq!(detail.invoice.booking_id, Some(booking.booking.id));
    }

    #[test]
    fn test_falls_back_to_submitted_amount_for_free_booking() {
        let mut conn = setup_db();
        let free = seed_service(&conn, 0.0);

        let detail = create_invoice(
            &mut conn,
            &NewInvoice {
                booking: Some(inline_booking(vec![free])),
                total_amount: Some(80_000.0),
                ..Default::default()
            },
            false,
        )
        .unwrap();
        assert_eq!(detail.invoice.total_amount, 80_000.0);
    }

    #[test]
    fn test_unknown_booking_is_not_found() {
        let mut conn = setup_db();
        let err = create_invoice(
            &mut conn,
            &NewInvoice {
                booking_id: Some(9),
                ..Default::default()
            },
            false,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_strict_mode_requires_completed_booking() {
        let mut conn = setup_db();
        let a = seed_service(&conn, 100_000.0);
        let booking = bookings::create_booking(&mut conn, &inline_booking(vec![a]))
            .unwrap()
            .booking;
        let input = NewInvoice {
            booking_id: Some(booking.id),
            ..Default::default()
        };

        assert!(matches!(
            create_invoice(&mut conn, &input, true),
            Err(AppError::Conflict(_))
        ));

        queries::set_booking_status(&conn, booking.id, Status::Completed, &dates::now()).unwrap();
        assert!(create_invoice(&mut conn, &input, true).is_ok());
    }

    #[test]
    fn test_strict_mode_accepts_inline_booking() {
        let mut conn = setup_db();
        let a = seed_service(&conn, 100_000.0);

        let detail = create_invoice(
            &mut conn,
            &NewInvoice {
                booking: Some(inline_booking(vec![a])),
                ..Default::default()
            },
            true,
        )
        .unwrap();
        assert_eq!(detail.invoice.status, Status::Pending);
        assert_eq!(detail.booking.unwrap().booking.status, Status::Pending);
    }

    #[test]
    fn test_invoice_for_successful_booking_starts_successful() {
        let mut conn = setup_db();
        let a = seed_service(&conn, 100_000.0);
        let booking = bookings::create_booking(&mut conn, &inline_booking(vec![a]))
            .unwrap()
            .booking;
        queries::set_booking_status(&conn, booking.id, Status::Success, &dates::now()).unwrap();

        for strict in [false, true] {
            let detail = create_invoice(
                &mut conn,
                &NewInvoice {
                    booking_id: Some(booking.id),
                    ..Default::default()
                },
                strict,
            )
            .unwrap();
            assert_eq!(detail.invoice.status, Status::Success);
        }
    }

    #[test]
    fn test_deleting_booking_detaches_invoice() {
        let mut conn = setup_db();
        let a = seed_service(&conn, 100_000.0);
        let detail = create_invoice(
            &mut conn,
            &NewInvoice {
                booking: Some(inline_booking(vec![a])),
                ..Default::default()
            },
            false,
        )
        .unwrap();
        let booking_id = detail.invoice.booking_id.unwrap();

        bookings::delete_booking(&conn, booking_id).unwrap();

        let detail = load_detail(&conn, detail.invoice.id).unwrap();
        assert_eq!(detail.invoice.booking_id, None);
        assert!(detail.booking.is_none());
    }
}
