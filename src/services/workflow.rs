use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::dates;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, Invoice, Status};

/// Checks `from -> to` against the transition table. Outside strict mode a
/// jump the table does not allow is only logged.
pub fn check_transition(from: Status, to: Status, strict: bool) -> Result<(), AppError> {
    if from.can_transition_to(to) {
        return Ok(());
    }
    if strict {
        return Err(AppError::InvalidTransition { from, to });
    }
    tracing::warn!(%from, %to, "status change outside the transition table");
    Ok(())
}

/// Validates a booking status change and runs its side effects. The caller
/// writes the booking row itself, inside the same transaction.
pub(crate) fn on_booking_status_change(
    conn: &Connection,
    booking_id: i64,
    from: Status,
    to: Status,
    strict: bool,
    now: &NaiveDateTime,
) -> Result<(), AppError> {
    check_transition(from, to, strict)?;
    if to == Status::Success {
        cascade_success(conn, booking_id, now)?;
    }
    Ok(())
}

/// Marks every invoice of the booking `success`, whatever its prior status.
fn cascade_success(conn: &Connection, booking_id: i64, now: &NaiveDateTime) -> anyhow::Result<usize> {
    for invoice in queries::get_invoices_for_booking(conn, booking_id)? {
        if invoice.status == Status::Cancelled {
            tracing::warn!(
                booking_id,
                invoice_id = invoice.id,
                "cancelled invoice forced to success by booking cascade"
            );
        }
    }

    let count = queries::set_invoice_status_for_booking(conn, booking_id, Status::Success, now)?;
    if count > 0 {
        tracing::info!(booking_id, invoices = count, "cascaded success to invoices");
    }
    Ok(count)
}

pub fn change_booking_status(
    conn: &mut Connection,
    id: i64,
    next: Status,
    strict: bool,
) -> Result<Booking, AppError> {
    let tx = conn.transaction()?;

    let booking = queries::get_booking(&tx, id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;

    let now = dates::now();
    on_booking_status_change(&tx, id, booking.status, next, strict, &now)?;
    queries::set_booking_status(&tx, id, next, &now)?;

    tx.commit()?;

    tracing::info!(booking_id = id, from = %booking.status, to = %next, "booking status changed");
    Ok(Booking {
        status: next,
        updated_at: now,
        ..booking
    })
}

/// Invoice status changes never cascade back to the booking.
pub fn change_invoice_status(
    conn: &Connection,
    id: i64,
    next: Status,
    strict: bool,
) -> Result<Invoice, AppError> {
    let invoice = queries::get_invoice(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("invoice {id}")))?;

    check_transition(invoice.status, next, strict)?;

    let now = dates::now();
    queries::set_invoice_status(conn, id, next, &now)?;

    tracing::info!(invoice_id = id, from = %invoice.status, to = %next, "invoice status changed");
    Ok(Invoice {
        status: next,
        updated_at: now,
        ..invoice
    })
}
