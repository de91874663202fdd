use anyhow::Result;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::config::Config;
use crate::models::{PartOrder, ServiceLine, Vehicle, WorkStatus};

/// Which document to print. Quotations leave out everything about payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintMode {
    Invoice,
    Quotation,
}

impl PrintMode {
    pub fn title(&self) -> &'static str {
        match self {
            PrintMode::Invoice => "Invoice",
            PrintMode::Quotation => "Quotation",
        }
    }

    fn slug(&self) -> &'static str {
        match self {
            PrintMode::Invoice => "invoice",
            PrintMode::Quotation => "quotation",
        }
    }
}

/// Shop details printed in the document header.
#[derive(Debug, Clone)]
pub struct ShopHeader {
    pub name: String,
    pub address: String,
    pub phones: String,
    pub email: String,
}

impl From<&Config> for ShopHeader {
    fn from(config: &Config) -> Self {
        Self {
            name: config.shop_name.clone(),
            address: config.shop_address.clone(),
            phones: config.shop_phones.clone(),
            email: config.shop_email.clone(),
        }
    }
}

/// Files written for one print job.
#[derive(Debug, Clone)]
pub struct PrintedDocument {
    pub html: PathBuf,
    pub pdf: Option<PathBuf>,
}

/// Everything the renderer needs, independent of record kind.
struct Sheet<'a> {
    party_label: &'static str,
    party: Vec<(&'static str, String)>,
    reference: String,
    date: Option<DateTime<Utc>>,
    lines: &'a [ServiceLine],
    notes: Vec<(&'static str, &'a str)>,
    discount: Decimal,
    total: Decimal,
    due: Decimal,
    paid: Decimal,
    pending: Decimal,
    status: WorkStatus,
    completion_date: Option<NaiveDate>,
    payment_method: Option<&'a str>,
}

/// Writes printable work orders and part orders as HTML, converted to PDF
/// with pandoc when it is available.
pub struct DocumentPrinter {
    output_dir: PathBuf,
    header: ShopHeader,
}

impl DocumentPrinter {
    pub fn new(output_dir: &str, header: ShopHeader) -> Result<Self> {
        let path = Path::new(output_dir);
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        Ok(Self {
            output_dir: path.to_path_buf(),
            header,
        })
    }

    pub fn print_vehicle(&self, vehicle: &Vehicle, mode: PrintMode) -> Result<PrintedDocument> {
        let html = render_vehicle(&self.header, vehicle, mode);
        let reference = if vehicle.vehicle_id.is_empty() {
            &vehicle.id
        } else {
            &vehicle.vehicle_id
        };
        self.write(&format!("{}_vehicle_{}", mode.slug(), file_safe(reference)), &html)
    }

    pub fn print_part_order(&self, order: &PartOrder, mode: PrintMode) -> Result<PrintedDocument> {
        let html = render_part_order(&self.header, order, mode);
        self.write(&format!("{}_order_{}", mode.slug(), file_safe(&order.id)), &html)
    }

    fn write(&self, stem: &str, html: &str) -> Result<PrintedDocument> {
        let html_path = self.output_dir.join(format!("{}.html", stem));
        let pdf_path = self.output_dir.join(format!("{}.pdf", stem));

        let mut file = File::create(&html_path)?;
        file.write_all(html.as_bytes())?;

        let pdf = match Command::new("pandoc").arg(&html_path).arg("-o").arg(&pdf_path).output() {
            Ok(output) if output.status.success() => Some(pdf_path),
            Ok(output) => {
                tracing::warn!(
                    stderr = %String::from_utf8_lossy(&output.stderr),
                    "pandoc failed; keeping HTML only"
                );
                None
            }
            Err(e) => {
                tracing::info!(error = %e, "pandoc not available; keeping HTML only");
                None
            }
        };

        tracing::info!(path = %html_path.display(), "wrote printable document");
        Ok(PrintedDocument {
            html: html_path,
            pdf,
        })
    }
}

fn file_safe(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "draft".to_string() } else { cleaned }
}

/// Day-month-year, as printed on every document.
pub fn format_day(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

pub fn render_vehicle(header: &ShopHeader, vehicle: &Vehicle, mode: PrintMode) -> String {
    let sheet = Sheet {
        party_label: "Customer",
        party: vec![
            ("Customer Name", vehicle.customer_name.clone()),
            ("Phone", vehicle.phone.clone()),
            ("Vehicle Reg No", vehicle.vehicle_reg_no.clone()),
            ("Brand & Model", vehicle.brand_and_model()),
            ("Mileage", vehicle.mileage.clone()),
        ],
        reference: vehicle.vehicle_id.clone(),
        date: vehicle.date,
        lines: &vehicle.services,
        notes: vec![
            ("Vehicle Analysis", vehicle.vehicle_analysis.as_str()),
            ("Parts & Supplies", vehicle.spare_parts.as_str()),
        ],
        discount: vehicle.discount,
        total: vehicle.total_amount,
        due: vehicle.due_amount,
        paid: vehicle.paid_amount,
        pending: vehicle.pending_amount,
        status: vehicle.status_of_work,
        completion_date: vehicle.completion_date,
        payment_method: Some(vehicle.payment_method.as_str()),
    };
    render(header, &sheet, mode)
}

pub fn render_part_order(header: &ShopHeader, order: &PartOrder, mode: PrintMode) -> String {
    let sheet = Sheet {
        party_label: "Supplier",
        party: vec![
            ("Supplier", order.supplier.clone()),
            ("Phone", order.phone.clone()),
            ("Target Vehicle", order.target_vehicle.clone()),
        ],
        reference: order.id.clone(),
        date: order.date,
        lines: &order.parts,
        notes: Vec::new(),
        discount: order.discount,
        total: order.total_amount,
        due: order.due_amount,
        paid: order.paid_amount,
        pending: order.pending_amount,
        status: order.status_of_work,
        completion_date: order.completion_date,
        payment_method: None,
    };
    render(header, &sheet, mode)
}

fn render(header: &ShopHeader, sheet: &Sheet<'_>, mode: PrintMode) -> String {
    let mut content = String::new();

    content.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    content.push_str(&format!("<title>{}</title>\n</head>\n<body>\n", mode.title()));
    content.push_str("<hr style=\"height: 5px; background-color: #343876; border: none;\">\n");
    content.push_str(&format!("<h1>{}</h1>\n", escape(&header.name)));
    content.push_str(&format!("<p>{}<br>\n", escape(&header.address)));
    content.push_str(&format!("{}<br>\n", escape(&header.phones)));
    content.push_str(&format!("{}</p>\n", escape(&header.email)));

    content.push_str(&format!("<h2>{}</h2>\n", mode.title()));
    if let Some(date) = sheet.date {
        content.push_str(&format!("<p>Date: {}</p>\n", format_day(date.date_naive())));
    }
    if !sheet.reference.is_empty() {
        content.push_str(&format!("<p><strong>Reference #</strong> {}</p>\n", escape(&sheet.reference)));
    }

    content.push_str(&format!("<p><strong>{}</strong><br>\n", sheet.party_label));
    for (label, value) in &sheet.party {
        if !value.is_empty() {
            content.push_str(&format!("{}: {}<br>\n", label, escape(value)));
        }
    }
    content.push_str("</p>\n<hr>\n");

    content.push_str("<table style=\"width: 100%; border-collapse: collapse;\">\n");
    content.push_str("<tr>\n");
    content.push_str("<th style=\"text-align: left;\">Description</th>\n");
    content.push_str("<th style=\"text-align: right;\">Unit Price (AED)</th>\n");
    content.push_str("<th style=\"text-align: right;\">Quantity</th>\n");
    content.push_str("<th style=\"text-align: right;\">VAT (AED)</th>\n");
    content.push_str("<th style=\"text-align: right;\">Total (AED)</th>\n");
    content.push_str("</tr>\n");
    for line in sheet.lines {
        content.push_str("<tr>\n");
        content.push_str(&format!("<td style=\"text-align: left;\">{}</td>\n", escape(&line.description)));
        content.push_str(&format!("<td style=\"text-align: right;\">{:.2}</td>\n", line.unit_price));
        content.push_str(&format!("<td style=\"text-align: right;\">{}</td>\n", line.quantity));
        content.push_str(&format!("<td style=\"text-align: right;\">{:.2}</td>\n", line.vat));
        content.push_str(&format!("<td style=\"text-align: right;\">{:.2}</td>\n", line.sub_total));
        content.push_str("</tr>\n");
    }
    content.push_str("</table>\n");

    for (label, text) in &sheet.notes {
        if !text.trim().is_empty() {
            content.push_str(&format!("<p><strong>{}:</strong> {}</p>\n", label, escape(text)));
        }
    }

    content.push_str("<p>\n");
    content.push_str(&format!("<strong>Total Amount:</strong> AED {:.2}<br>\n", sheet.total));
    if !sheet.discount.is_zero() {
        content.push_str(&format!("<strong>Discount:</strong> AED {:.2}<br>\n", sheet.discount));
    }
    content.push_str(&format!("<strong>Due Amount:</strong> AED {:.2}<br>\n", sheet.due));

    if mode == PrintMode::Invoice {
        content.push_str(&format!("<strong>Paid Amount:</strong> AED {:.2}<br>\n", sheet.paid));
        content.push_str(&format!("<strong>Pending Amount:</strong> AED {:.2}<br>\n", sheet.pending));
        if let Some(method) = sheet.payment_method.filter(|m| !m.is_empty()) {
            content.push_str(&format!("<strong>Payment Method:</strong> {}<br>\n", escape(method)));
        }
        content.push_str(&format!("<strong>Status of Work:</strong> {}<br>\n", sheet.status.as_str()));
        if let Some(done) = sheet.completion_date {
            content.push_str(&format!("<strong>Completion Date:</strong> {}<br>\n", format_day(done)));
        }
    }
    content.push_str("</p>\n</body>\n</html>\n");

    content
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn header() -> ShopHeader {
        ShopHeader {
            name: "FastFix Auto Maintenance".into(),
            address: "Industrial Area 5, Sharjah".into(),
            phones: "0529479330".into(),
            email: "shop@example.com".into(),
        }
    }

    fn settled_vehicle() -> Vehicle {
        Vehicle {
            vehicle_id: "1042".into(),
            customer_name: "Ahmed".into(),
            payment_method: "Cash".into(),
            services: vec![ServiceLine {
                description: "Oil Change".into(),
                unit_price: dec!(300),
                quantity: 1,
                vat: dec!(15),
                vat_manually_set: false,
                sub_total: dec!(315),
            }],
            total_amount: dec!(315),
            due_amount: dec!(315),
            paid_amount: dec!(315),
            status_of_work: WorkStatus::Done,
            completion_date: NaiveDate::from_ymd_opt(2024, 6, 2),
            ..Default::default()
        }
    }

    #[test]
    fn invoice_shows_payment_status() {
        let doc = render_vehicle(&header(), &settled_vehicle(), PrintMode::Invoice);
        assert!(doc.contains("<h2>Invoice</h2>"));
        assert!(doc.contains("Oil Change"));
        assert!(doc.contains("<strong>Paid Amount:</strong> AED 315.00"));
        assert!(doc.contains("<strong>Status of Work:</strong> DONE"));
        assert!(doc.contains("<strong>Completion Date:</strong> 02-06-2024"));
        assert!(doc.contains("<strong>Payment Method:</strong> Cash"));
    }

    #[test]
    fn quotation_hides_payment_status() {
        let doc = render_vehicle(&header(), &settled_vehicle(), PrintMode::Quotation);
        assert!(doc.contains("<h2>Quotation</h2>"));
        assert!(doc.contains("<strong>Due Amount:</strong> AED 315.00"));
        assert!(!doc.contains("Paid Amount"));
        assert!(!doc.contains("Pending Amount"));
        assert!(!doc.contains("Status of Work"));
        assert!(!doc.contains("Completion Date"));
        assert!(!doc.contains("Payment Method"));
    }

    #[test]
    fn header_and_text_are_escaped() {
        let mut vehicle = settled_vehicle();
        vehicle.customer_name = "Tom & Jerry <LLC>".into();
        let doc = render_vehicle(&header(), &vehicle, PrintMode::Invoice);
        assert!(doc.contains("Industrial Area 5, Sharjah"));
        assert!(doc.contains("Tom &amp; Jerry &lt;LLC&gt;"));
    }

    #[test]
    fn quotes_in_line_items_are_escaped() {
        let mut vehicle = settled_vehicle();
        vehicle.services[0].description = "Driver's \"door\" seal".into();
        let doc = render_vehicle(&header(), &vehicle, PrintMode::Invoice);
        assert!(doc.contains("Driver&#39;s &quot;door&quot; seal"));
        assert!(!doc.contains("Driver's"));
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(file_safe("65a/1 b"), "65a_1_b");
        assert_eq!(file_safe(""), "draft");
    }
}
