use chrono::NaiveDateTime;
use rusqlite::types::{ToSql, Type};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::dates;
use crate::models::{
    Booking, BookingDetail, BookingQuery, HairStyle, HairStyleChanges, HairStyleQuery, Invoice,
    InvoiceQuery, NewHairStyle, NewService, PageRequest, RevenueInvoice, Role, Service,
    ServiceQuery, ServiceStep, SortDirection, Status, StepInput, User, UserQuery,
};
use crate::models::page::keyword_pattern;

// ── Filtering ──

/// WHERE clauses with numbered parameters. `{}` in a clause is replaced by
/// the placeholder of the value pushed with it, so one value can be
/// referenced several times.
#[derive(Default)]
struct Conditions {
    clauses: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
}

impl Conditions {
    fn push(&mut self, clause: &str, value: impl ToSql + 'static) {
        self.params.push(Box::new(value));
        let placeholder = format!("?{}", self.params.len());
        self.clauses.push(clause.replace("{}", &placeholder));
    }

    fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// Appends LIMIT/OFFSET parameters and returns the matching SQL.
    fn paginate(&mut self, page: PageRequest) -> String {
        self.params.push(Box::new(page.size));
        self.params.push(Box::new(page.offset()));
        let n = self.params.len();
        format!(" LIMIT ?{} OFFSET ?{}", n - 1, n)
    }
}

fn datetime_at(row: &Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    dates::from_db(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("invalid timestamp: {raw}").into(),
        )
    })
}

fn order_sql(column: &str, id_column: &str, direction: SortDirection) -> String {
    let dir = direction.as_sql();
    format!(" ORDER BY {column} {dir}, {id_column} {dir}")
}

// ── Users ──

const USER_COLUMNS: &str = "id, full_name, phone, email, role, created_at, updated_at";

fn parse_user_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        full_name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        role: row.get(4)?,
        created_at: datetime_at(row, 5)?,
        updated_at: datetime_at(row, 6)?,
    })
}

pub fn get_user(conn: &Connection, id: i64) -> anyhow::Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            parse_user_row,
        )
        .optional()?;
    Ok(user)
}

pub fn find_user_by_phone(conn: &Connection, phone: &str) -> anyhow::Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE phone = ?1"),
            params![phone],
            parse_user_row,
        )
        .optional()?;
    Ok(user)
}

pub fn insert_user(
    conn: &Connection,
    full_name: Option<&str>,
    phone: &str,
    email: Option<&str>,
    role: Role,
) -> anyhow::Result<i64> {
    let now = dates::to_db(&dates::now());
    conn.execute(
        "INSERT INTO users (full_name, phone, email, role, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![full_name, phone, email, role, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_user(conn: &Connection, user: &User) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE users SET full_name = ?1, phone = ?2, email = ?3, role = ?4, updated_at = ?5
         WHERE id = ?6",
        params![
            user.full_name,
            user.phone,
            user.email,
            user.role,
            dates::to_db(&user.updated_at),
            user.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_user(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn list_users(
    conn: &Connection,
    query: &UserQuery,
    page: PageRequest,
) -> anyhow::Result<(Vec<User>, i64)> {
    let mut cond = Conditions::default();
    if let Some(pattern) = keyword_pattern(query.keyword.as_deref()) {
        cond.push(
            "(phone LIKE {} ESCAPE '\\' OR full_name LIKE {} ESCAPE '\\' OR email LIKE {} ESCAPE '\\')",
            pattern,
        );
    }
    if let Some(role) = query.role {
        cond.push("role = {}", role);
    }

    let where_sql = cond.where_sql();
    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM users{where_sql}"),
        params_from_iter(cond.params.iter()),
        |row| row.get(0),
    )?;

    let order = order_sql(
        query.sort_by.column(),
        "id",
        query.sort_direction.unwrap_or(SortDirection::Asc),
    );
    let limit = cond.paginate(page);
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users{where_sql}{order}{limit}"
    ))?;
    let users = stmt
        .query_map(params_from_iter(cond.params.iter()), parse_user_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok((users, total))
}

// ── Services ──

const SERVICE_COLUMNS: &str =
    "id, service_name, price, estimated_time, description, banner_image_url, created_at, updated_at";

fn parse_service_row(row: &Row) -> rusqlite::Result<Service> {
    Ok(Service {
        id: row.get(0)?,
        service_name: row.get(1)?,
        price: row.get(2)?,
        estimated_time: row.get(3)?,
        description: row.get(4)?,
        banner_image_url: row.get(5)?,
        created_at: datetime_at(row, 6)?,
        updated_at: datetime_at(row, 7)?,
    })
}

pub fn get_service(conn: &Connection, id: i64) -> anyhow::Result<Option<Service>> {
    let service = conn
        .query_row(
            &format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = ?1"),
            params![id],
            parse_service_row,
        )
        .optional()?;
    Ok(service)
}

/// Services for the given ids, ordered by id. Unknown ids are skipped.
pub fn get_services_by_ids(conn: &Connection, ids: &[i64]) -> anyhow::Result<Vec<Service>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let placeholders = (1..=ids.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut stmt = conn.prepare(&format!(
        "SELECT {SERVICE_COLUMNS} FROM services WHERE id IN ({placeholders}) ORDER BY id"
    ))?;
    let services = stmt
        .query_map(params_from_iter(ids.iter()), parse_service_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(services)
}

pub fn count_services(conn: &Connection) -> anyhow::Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM services", [], |row| row.get(0))?;
    Ok(count)
}

pub fn insert_service(conn: &Connection, service: &NewService) -> anyhow::Result<i64> {
    let now = dates::to_db(&dates::now());
    conn.execute(
        "INSERT INTO services (service_name, price, estimated_time, description, banner_image_url, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            service.service_name,
            service.price,
            service.estimated_time.unwrap_or(0),
            service.description,
            service.banner_image_url,
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_service(conn: &Connection, service: &Service) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE services SET service_name = ?1, price = ?2, estimated_time = ?3, description = ?4,
           banner_image_url = ?5, updated_at = ?6
         WHERE id = ?7",
        params![
            service.service_name,
            service.price,
            service.estimated_time,
            service.description,
            service.banner_image_url,
            dates::to_db(&service.updated_at),
            service.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_service(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM services WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn list_services(
    conn: &Connection,
    query: &ServiceQuery,
    page: PageRequest,
) -> anyhow::Result<(Vec<Service>, i64)> {
    let mut cond = Conditions::default();
    if let Some(pattern) = keyword_pattern(query.keyword.as_deref()) {
        cond.push(
            "(service_name LIKE {} ESCAPE '\\' OR description LIKE {} ESCAPE '\\')",
            pattern,
        );
    }

    let where_sql = cond.where_sql();
    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM services{where_sql}"),
        params_from_iter(cond.params.iter()),
        |row| row.get(0),
    )?;

    let order = order_sql(
        query.sort_by.column(),
        "id",
        query.sort_direction.unwrap_or(SortDirection::Asc),
    );
    let limit = cond.paginate(page);
    let mut stmt = conn.prepare(&format!(
        "SELECT {SERVICE_COLUMNS} FROM services{where_sql}{order}{limit}"
    ))?;
    let services = stmt
        .query_map(params_from_iter(cond.params.iter()), parse_service_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok((services, total))
}

pub fn get_service_steps(conn: &Connection, service_id: i64) -> anyhow::Result<Vec<ServiceStep>> {
    let mut stmt = conn.prepare(
        "SELECT step_order, step_title, step_description, step_image_url
         FROM service_steps WHERE service_id = ?1 ORDER BY step_order ASC",
    )?;
    let steps = stmt
        .query_map(params![service_id], |row| {
            Ok(ServiceStep {
                step_order: row.get(0)?,
                step_title: row.get(1)?,
                step_description: row.get(2)?,
                step_image_url: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(steps)
}

/// Deletes every step of the service and inserts `steps` numbered from 1.
pub fn replace_service_steps(
    conn: &Connection,
    service_id: i64,
    steps: &[StepInput],
) -> anyhow::Result<()> {
    conn.execute("DELETE FROM service_steps WHERE service_id = ?1", params![service_id])?;

    let mut stmt = conn.prepare(
        "INSERT INTO service_steps (service_id, step_order, step_title, step_description, step_image_url)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for (index, step) in steps.iter().enumerate() {
        stmt.execute(params![
            service_id,
            index as i64 + 1,
            step.step_title,
            step.step_description,
            step.step_image_url,
        ])?;
    }
    Ok(())
}

// ── Hair Styles ──

const HAIR_STYLE_COLUMNS: &str = "id, name, description, image_url, created_at, updated_at";

fn parse_hair_style_row(row: &Row) -> rusqlite::Result<HairStyle> {
    Ok(HairStyle {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        image_url: row.get(3)?,
        created_at: datetime_at(row, 4)?,
        updated_at: datetime_at(row, 5)?,
    })
}

pub fn get_hair_style(conn: &Connection, id: i64) -> anyhow::Result<Option<HairStyle>> {
    let style = conn
        .query_row(
            &format!("SELECT {HAIR_STYLE_COLUMNS} FROM hair_styles WHERE id = ?1"),
            params![id],
            parse_hair_style_row,
        )
        .optional()?;
    Ok(style)
}

pub fn insert_hair_style(conn: &Connection, style: &NewHairStyle) -> anyhow::Result<i64> {
    let now = dates::to_db(&dates::now());
    conn.execute(
        "INSERT INTO hair_styles (name, description, image_url, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![style.name, style.description, style.image_url, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Applies only the fields that are present.
pub fn update_hair_style(
    conn: &Connection,
    id: i64,
    changes: &HairStyleChanges,
) -> anyhow::Result<bool> {
    let now = dates::to_db(&dates::now());
    let count = conn.execute(
        "UPDATE hair_styles SET
           name = COALESCE(?1, name),
           description = COALESCE(?2, description),
           image_url = COALESCE(?3, image_url),
           updated_at = ?4
         WHERE id = ?5",
        params![changes.name, changes.description, changes.image_url, now, id],
    )?;
    Ok(count > 0)
}

pub fn delete_hair_style(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM hair_styles WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn list_hair_styles(
    conn: &Connection,
    query: &HairStyleQuery,
    page: PageRequest,
) -> anyhow::Result<(Vec<HairStyle>, i64)> {
    let mut cond = Conditions::default();
    if let Some(pattern) = keyword_pattern(query.keyword.as_deref()) {
        cond.push(
            "(name LIKE {} ESCAPE '\\' OR description LIKE {} ESCAPE '\\')",
            pattern,
        );
    }

    let where_sql = cond.where_sql();
    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM hair_styles{where_sql}"),
        params_from_iter(cond.params.iter()),
        |row| row.get(0),
    )?;

    let order = order_sql(
        query.sort_by.column(),
        "id",
        query.sort_direction.unwrap_or(SortDirection::Asc),
    );
    let limit = cond.paginate(page);
    let mut stmt = conn.prepare(&format!(
        "SELECT {HAIR_STYLE_COLUMNS} FROM hair_styles{where_sql}{order}{limit}"
    ))?;
    let styles = stmt
        .query_map(params_from_iter(cond.params.iter()), parse_hair_style_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok((styles, total))
}

// ── Bookings ──

const BOOKING_COLUMNS: &str = "b.id, b.customer_id, b.employee_id, b.appointment_date, b.status, \
     b.total_price, b.notes, b.created_at, b.updated_at";

fn parse_booking_row(row: &Row) -> rusqlite::Result<Booking> {
    Ok(Booking {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        employee_id: row.get(2)?,
        appointment_date: datetime_at(row, 3)?,
        status: row.get(4)?,
        total_price: row.get(5)?,
        notes: row.get(6)?,
        created_at: datetime_at(row, 7)?,
        updated_at: datetime_at(row, 8)?,
    })
}

/// Inserts a booking and returns its new id. `booking.id` is ignored.
pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO bookings (customer_id, employee_id, appointment_date, status, total_price, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            booking.customer_id,
            booking.employee_id,
            dates::to_db(&booking.appointment_date),
            booking.status,
            booking.total_price,
            booking.notes,
            dates::to_db(&booking.created_at),
            dates::to_db(&booking.updated_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Overwrites every mutable column of the booking.
pub fn update_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET customer_id = ?1, employee_id = ?2, appointment_date = ?3, status = ?4,
           total_price = ?5, notes = ?6, updated_at = ?7
         WHERE id = ?8",
        params![
            booking.customer_id,
            booking.employee_id,
            dates::to_db(&booking.appointment_date),
            booking.status,
            booking.total_price,
            booking.notes,
            dates::to_db(&booking.updated_at),
            booking.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn get_booking(conn: &Connection, id: i64) -> anyhow::Result<Option<Booking>> {
    let booking = conn
        .query_row(
            &format!("SELECT {BOOKING_COLUMNS} FROM bookings b WHERE b.id = ?1"),
            params![id],
            parse_booking_row,
        )
        .optional()?;
    Ok(booking)
}

pub fn delete_booking(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn set_booking_status(
    conn: &Connection,
    id: i64,
    status: Status,
    now: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status, dates::to_db(now), id],
    )?;
    Ok(count > 0)
}

pub fn get_booking_services(conn: &Connection, booking_id: i64) -> anyhow::Result<Vec<Service>> {
    let mut stmt = conn.prepare(
        "SELECT s.id, s.service_name, s.price, s.estimated_time, s.description, s.banner_image_url,
                s.created_at, s.updated_at
         FROM booking_services bs
         JOIN services s ON s.id = bs.service_id
         WHERE bs.booking_id = ?1
         ORDER BY s.id",
    )?;
    let services = stmt
        .query_map(params![booking_id], parse_service_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(services)
}

/// Drops the booking's current service links and links `service_ids`.
pub fn replace_booking_services(
    conn: &Connection,
    booking_id: i64,
    service_ids: &[i64],
) -> anyhow::Result<()> {
    conn.execute(
        "DELETE FROM booking_services WHERE booking_id = ?1",
        params![booking_id],
    )?;

    let mut stmt =
        conn.prepare("INSERT INTO booking_services (booking_id, service_id) VALUES (?1, ?2)")?;
    for service_id in service_ids {
        stmt.execute(params![booking_id, service_id])?;
    }
    Ok(())
}

pub fn get_booking_detail(conn: &Connection, id: i64) -> anyhow::Result<Option<BookingDetail>> {
    match get_booking(conn, id)? {
        Some(booking) => Ok(Some(expand_booking(conn, booking)?)),
        None => Ok(None),
    }
}

pub fn expand_booking(conn: &Connection, booking: Booking) -> anyhow::Result<BookingDetail> {
    let customer = get_user(conn, booking.customer_id)?;
    let employee = match booking.employee_id {
        Some(id) => get_user(conn, id)?,
        None => None,
    };
    let services = get_booking_services(conn, booking.id)?;
    Ok(BookingDetail {
        booking,
        customer,
        employee,
        services,
    })
}

pub fn list_bookings(
    conn: &Connection,
    query: &BookingQuery,
    page: PageRequest,
) -> anyhow::Result<(Vec<Booking>, i64)> {
    let mut cond = Conditions::default();
    if let Some(employee_id) = query.employee_id {
        cond.push("b.employee_id = {}", employee_id);
    }
    if let Some(status) = query.status {
        cond.push("b.status = {}", status);
    }
    let (start, end) = dates::day_bounds(query.date_from, query.date_to);
    if let Some(start) = start {
        cond.push("b.appointment_date >= {}", dates::to_db(&start));
    }
    if let Some(end) = end {
        cond.push("b.appointment_date < {}", dates::to_db(&end));
    }
    if let Some(pattern) = keyword_pattern(query.keyword.as_deref()) {
        cond.push(
            "(c.phone LIKE {} ESCAPE '\\' OR c.full_name LIKE {} ESCAPE '\\')",
            pattern,
        );
    }

    let from_sql = "FROM bookings b JOIN users c ON c.id = b.customer_id";
    let where_sql = cond.where_sql();
    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) {from_sql}{where_sql}"),
        params_from_iter(cond.params.iter()),
        |row| row.get(0),
    )?;

    let order = order_sql(
        query.sort_by.column(),
        "b.id",
        query.sort_direction.unwrap_or(SortDirection::Desc),
    );
    let limit = cond.paginate(page);
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} {from_sql}{where_sql}{order}{limit}"
    ))?;
    let bookings = stmt
        .query_map(params_from_iter(cond.params.iter()), parse_booking_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok((bookings, total))
}

// ── Invoices ──

const INVOICE_COLUMNS: &str =
    "i.id, i.booking_id, i.invoice_date, i.total_amount, i.status, i.created_at, i.updated_at";

fn parse_invoice_row(row: &Row) -> rusqlite::Result<Invoice> {
    Ok(Invoice {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        invoice_date: datetime_at(row, 2)?,
        total_amount: row.get(3)?,
        status: row.get(4)?,
        created_at: datetime_at(row, 5)?,
        updated_at: datetime_at(row, 6)?,
    })
}

/// Inserts an invoice and returns its new id. `invoice.id` is ignored.
pub fn insert_invoice(conn: &Connection, invoice: &Invoice) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO invoices (booking_id, invoice_date, total_amount, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            invoice.booking_id,
            dates::to_db(&invoice.invoice_date),
            invoice.total_amount,
            invoice.status,
            dates::to_db(&invoice.created_at),
            dates::to_db(&invoice.updated_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_invoice(conn: &Connection, id: i64) -> anyhow::Result<Option<Invoice>> {
    let invoice = conn
        .query_row(
            &format!("SELECT {INVOICE_COLUMNS} FROM invoices i WHERE i.id = ?1"),
            params![id],
            parse_invoice_row,
        )
        .optional()?;
    Ok(invoice)
}

pub fn get_invoices_for_booking(conn: &Connection, booking_id: i64) -> anyhow::Result<Vec<Invoice>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {INVOICE_COLUMNS} FROM invoices i WHERE i.booking_id = ?1 ORDER BY i.id"
    ))?;
    let invoices = stmt
        .query_map(params![booking_id], parse_invoice_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(invoices)
}

pub fn delete_invoice(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM invoices WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn set_invoice_status(
    conn: &Connection,
    id: i64,
    status: Status,
    now: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE invoices SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status, dates::to_db(now), id],
    )?;
    Ok(count > 0)
}

/// Sets the status of every invoice raised for the booking. Returns how
/// many rows were touched.
pub fn set_invoice_status_for_booking(
    conn: &Connection,
    booking_id: i64,
    status: Status,
    now: &NaiveDateTime,
) -> anyhow::Result<usize> {
    let count = conn.execute(
        "UPDATE invoices SET status = ?1, updated_at = ?2 WHERE booking_id = ?3",
        params![status, dates::to_db(now), booking_id],
    )?;
    Ok(count)
}

pub fn list_invoices(
    conn: &Connection,
    query: &InvoiceQuery,
    page: PageRequest,
) -> anyhow::Result<(Vec<Invoice>, i64)> {
    let mut cond = Conditions::default();
    if let Some(status) = query.status {
        cond.push("i.status = {}", status);
    }
    let (start, end) = dates::day_bounds(query.date_from, query.date_to);
    if let Some(start) = start {
        cond.push("i.invoice_date >= {}", dates::to_db(&start));
    }
    if let Some(end) = end {
        cond.push("i.invoice_date < {}", dates::to_db(&end));
    }
    if let Some(pattern) = keyword_pattern(query.keyword.as_deref()) {
        cond.push(
            "(c.phone LIKE {} ESCAPE '\\' OR c.full_name LIKE {} ESCAPE '\\')",
            pattern,
        );
    }

    let from_sql = "FROM invoices i
         LEFT JOIN bookings b ON b.id = i.booking_id
         LEFT JOIN users c ON c.id = b.customer_id";
    let where_sql = cond.where_sql();
    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) {from_sql}{where_sql}"),
        params_from_iter(cond.params.iter()),
        |row| row.get(0),
    )?;

    let order = order_sql(
        query.sort_by.column(),
        "i.id",
        query.sort_direction.unwrap_or(SortDirection::Desc),
    );
    let limit = cond.paginate(page);
    let mut stmt = conn.prepare(&format!(
        "SELECT {INVOICE_COLUMNS} {from_sql}{where_sql}{order}{limit}"
    ))?;
    let invoices = stmt
        .query_map(params_from_iter(cond.params.iter()), parse_invoice_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok((invoices, total))
}

// ── Revenue ──

/// Successful invoices with `start <= invoice_date < end`, each carrying
/// the distinct services of its booking.
pub fn successful_invoices(
    conn: &Connection,
    start: Option<&NaiveDateTime>,
    end: Option<&NaiveDateTime>,
    employee_id: Option<i64>,
) -> anyhow::Result<Vec<RevenueInvoice>> {
    let mut cond = Conditions::default();
    cond.push("i.status = {}", Status::Success);
    if let Some(start) = start {
        cond.push("i.invoice_date >= {}", dates::to_db(start));
    }
    if let Some(end) = end {
        cond.push("i.invoice_date < {}", dates::to_db(end));
    }
    if let Some(employee_id) = employee_id {
        cond.push("b.employee_id = {}", employee_id);
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT i.id, i.invoice_date, i.total_amount, s.id, s.service_name
         FROM invoices i
         LEFT JOIN bookings b ON b.id = i.booking_id
         LEFT JOIN booking_services bs ON bs.booking_id = b.id
         LEFT JOIN services s ON s.id = bs.service_id{}
         ORDER BY i.id, s.id",
        cond.where_sql()
    ))?;

    let rows = stmt.query_map(params_from_iter(cond.params.iter()), |row| {
        Ok((
            row.get::<_, i64>(0)?,
            datetime_at(row, 1)?,
            row.get::<_, f64>(2)?,
            row.get::<_, Option<i64>>(3)?,
            row.get::<_, Option<String>>(4)?,
        ))
    })?;

    let mut invoices: Vec<(i64, RevenueInvoice)> = vec![];
    for row in rows {
        let (invoice_id, invoice_date, total_amount, service_id, service_name) = row?;
        let is_new = invoices.last().map(|(id, _)| *id != invoice_id).unwrap_or(true);
        if is_new {
            invoices.push((
                invoice_id,
                RevenueInvoice {
                    invoice_date,
                    total_amount,
                    services: vec![],
                },
            ));
        }
        if let (Some((_, current)), Some(id)) = (invoices.last_mut(), service_id) {
            current
                .services
                .push((id, service_name.unwrap_or_else(|| "Unknown".to_string())));
        }
    }

    Ok(invoices.into_iter().map(|(_, invoice)| invoice).collect())
}

pub fn service_in_use(conn: &Connection, service_id: i64) -> anyhow::Result<bool> {
    let used: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM booking_services WHERE service_id = ?1",
        params![service_id],
        |row| row.get(0),
    )?;
    Ok(used)
}
