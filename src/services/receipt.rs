use crate::models::InvoiceDetail;

const RULE: &str = "----------------------------------------";

/// Renders an invoice as a plain-text receipt.
pub fn generate_receipt(detail: &InvoiceDetail, business_name: &str) -> String {
    let invoice = &detail.invoice;
    let mut lines = vec![
        business_name.to_string(),
        format!("INVOICE #{}", invoice.id),
        format!("Date: {}", invoice.invoice_date.format("%Y-%m-%d %H:%M")),
        format!("Status: {}", invoice.status),
    ];

    if let Some(booking) = &detail.booking {
        if let Some(customer) = &booking.customer {
            let name = customer.full_name.as_deref().unwrap_or("Guest");
            lines.push(format!("Customer: {name} ({})", customer.phone));
        }
        if let Some(employee) = &booking.employee {
            let name = employee.full_name.as_deref().unwrap_or(&employee.phone);
            lines.push(format!("Stylist: {name}"));
        }
        lines.push(format!(
            "Appointment: {}",
            booking.booking.appointment_date.format("%Y-%m-%d %H:%M")
        ));
        lines.push(RULE.to_string());
        // catalog prices are current ones, not what the booking was priced at
        for service in &booking.services {
            lines.push(format!("- {}", service.service_name));
        }
    }

    lines.push(RULE.to_string());
    lines.push(item_line("TOTAL", invoice.total_amount));

    let mut text = lines.join("\r\n");
    text.push_str("\r\n");
    text
}

fn item_line(label: &str, amount: f64) -> String {
    let amount = format_amount(amount);
    let width = RULE.len().saturating_sub(amount.len() + 1);
    format!("{label:<width$} {amount}")
}

fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}
