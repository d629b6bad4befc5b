//! Printable HTML preview of a single order.
//!
//! This is the document the browser tooling fed into its PDF/print pipeline;
//! those pipelines are external collaborators, so rendering stops at a
//! self-contained HTML string. Required-field validation runs before any
//! markup is produced.

use rust_decimal::Decimal;

use order_core::calculations::RoundingPolicy;
use order_core::models::{OrderRecord, ValidationError};

/// The item table is padded with blank rows up to this count so short orders
/// still look like a form.
pub const MIN_PREVIEW_ROWS: usize = 3;

/// Escapes a value for HTML text content; newlines become `<br>` so
/// multi-line remarks keep their line breaks.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '\n' => escaped.push_str("<br>"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// `YYYY-MM-DD` → `YYYY年M月D日`. A blank value renders the fallback; an
/// unparseable value renders as-is rather than erroring.
pub fn format_date_jp(
    value: &str,
    fallback: &str,
) -> String {
    let value = value.trim();
    if value.is_empty() {
        return fallback.to_string();
    }
    match chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => {
            use chrono::Datelike;
            format!("{}年{}月{}日", date.year(), date.month(), date.day())
        }
        Err(_) => value.to_string(),
    }
}

/// `YYYY-MM` → `YYYY年M月`, with the same blank/unparseable behavior as
/// [`format_date_jp`].
pub fn format_month_jp(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return "—".to_string();
    }
    match value.split_once('-') {
        Some((year, month)) => match month.parse::<u32>() {
            Ok(month) if !year.is_empty() => format!("{year}年{month}月"),
            _ => value.to_string(),
        },
        None => value.to_string(),
    }
}

/// Formats an amount with thousands separators, no currency sign.
pub fn format_amount(amount: Decimal) -> String {
    let text = amount.normalize().to_string();
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rest, None),
    };

    let digits = int_part.len();
    let mut grouped = String::with_capacity(digits + digits / 3);
    for (index, ch) in int_part.chars().enumerate() {
        if index > 0 && (digits - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

fn yen(amount: Decimal) -> String {
    format!("¥{}", format_amount(amount))
}

/// Builds the full preview document for one order.
///
/// # Errors
/// [`ValidationError`] when required counterparty fields are missing; the
/// order itself is never modified.
pub fn build_preview(
    record: &OrderRecord,
    policy: RoundingPolicy,
) -> Result<String, ValidationError> {
    record.validate_for_preview()?;

    let totals = record.totals(policy);
    let tax_percent = (record.tax_rate * Decimal::ONE_HUNDRED).normalize();

    let mut html = String::with_capacity(4096);
    html.push_str("<article class=\"order-preview\">\n");

    // Header: title, order number, key dates.
    html.push_str("<header class=\"preview-header\">\n");
    html.push_str("<div class=\"preview-title\"><small>ORDER FORM</small><h1>発注書</h1>");
    html.push_str(&format!(
        "<span>{}</span></div>\n",
        escape_html(&record.order_number)
    ));
    html.push_str("<dl class=\"preview-meta\">\n");
    html.push_str(&format!(
        "<dt>発注日</dt><dd>{}</dd>\n",
        format_date_jp(&record.order_date, "—")
    ));
    html.push_str(&format!(
        "<dt>納期</dt><dd>{}</dd>\n",
        format_date_jp(record.delivery_date.as_deref().unwrap_or(""), "別途ご連絡")
    ));
    html.push_str(&format!(
        "<dt>支払期日</dt><dd>{}</dd>\n",
        format_date_jp(&record.payment_due_date, "支払条件参照")
    ));
    html.push_str(&format!(
        "<dt>支払条件</dt><dd>{}</dd>\n",
        escape_html(if record.payment_terms.is_empty() {
            "—"
        } else {
            &record.payment_terms
        })
    ));
    html.push_str("</dl>\n</header>\n");

    // Issuing company.
    html.push_str("<section class=\"preview-section\">\n<h3>発注元</h3>\n<div class=\"preview-box\">");
    html.push_str(&format!("<strong>{}</strong><br>", escape_html(&record.company_name)));
    html.push_str(&format!("{}<br>", escape_html(&record.company_address)));
    html.push_str(&format!("{}<br>", escape_html(&record.company_phone)));
    html.push_str(&format!("{}<br>", escape_html(&record.company_email)));
    if let Some(code) = &record.company_code {
        html.push_str(&format!("登録番号: {}", escape_html(code)));
    }
    html.push_str("</div>\n</section>\n");

    // Supplier.
    html.push_str("<section class=\"preview-section\">\n<h3>発注先</h3>\n<div class=\"preview-box\">");
    html.push_str(&format!(
        "<strong>{} 御中</strong><br>",
        escape_html(&record.supplier_name)
    ));
    html.push_str(&format!("{}<br>", escape_html(&record.supplier_address)));
    if !record.contact_person.is_empty() {
        html.push_str(&format!("担当: {} 様<br>", escape_html(&record.contact_person)));
    }
    if let Some(location) = &record.delivery_location {
        html.push_str(&format!("納入場所: {}<br>", escape_html(location)));
    }
    html.push_str("</div>\n</section>\n");

    // Schedule.
    html.push_str("<section class=\"preview-section\">\n<h3>工事 / スケジュール</h3>\n<div class=\"preview-box\">");
    html.push_str(&format!(
        "工事完了予定: {}<br>",
        format_month_jp(&record.completion_month)
    ));
    html.push_str(&format!(
        "担当者: {}",
        escape_html(if record.staff_member.is_empty() {
            "—"
        } else {
            &record.staff_member
        })
    ));
    html.push_str("</div>\n</section>\n");

    // Item table.
    html.push_str("<section class=\"preview-section\">\n<h3>商品情報</h3>\n");
    html.push_str("<table class=\"items-table\">\n<thead>\n<tr><th>工事名</th><th>商品名</th><th>数量</th><th>単位</th><th>単価</th><th>小計</th></tr>\n</thead>\n<tbody>\n");
    let mut row_count = 0;
    for item in record.renderable_items() {
        row_count += 1;
        let quantity = if item.quantity.is_zero() {
            String::new()
        } else {
            item.quantity.normalize().to_string()
        };
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&item.project_name),
            escape_html(&item.name),
            quantity,
            escape_html(&item.unit),
            yen(item.price),
            yen(item.subtotal()),
        ));
    }
    for _ in row_count..MIN_PREVIEW_ROWS {
        html.push_str("<tr><td>&nbsp;</td><td></td><td></td><td></td><td></td><td></td></tr>\n");
    }
    html.push_str("</tbody>\n</table>\n</section>\n");

    // Totals.
    html.push_str("<section class=\"preview-totals\">\n");
    html.push_str(&format!(
        "<div><span>小計</span><span>{}</span></div>\n",
        yen(totals.subtotal)
    ));
    html.push_str(&format!(
        "<div><span>消費税 ({tax_percent}%)</span><span>{}</span></div>\n",
        yen(totals.tax)
    ));
    html.push_str(&format!(
        "<div class=\"grand\"><span>合計</span><span>{}</span></div>\n",
        yen(totals.total)
    ));
    html.push_str("</section>\n");

    // Optional sections.
    if let Some(bank_details) = &record.bank_details {
        html.push_str(&format!(
            "<section class=\"preview-section\">\n<h3>振込先</h3>\n<div class=\"preview-box\">{}</div>\n</section>\n",
            escape_html(bank_details)
        ));
    }
    let remarks = record
        .notes
        .as_deref()
        .filter(|notes| !notes.is_empty())
        .unwrap_or(&record.remarks);
    if !remarks.is_empty() {
        html.push_str(&format!(
            "<section class=\"preview-section\">\n<h3>備考</h3>\n<div class=\"preview-box notes-box\">{}</div>\n</section>\n",
            escape_html(remarks)
        ));
    }

    // Stamp block.
    if !record.staff_member.is_empty() {
        html.push_str(&format!(
            "<footer class=\"preview-footer\">\n<div class=\"signature-block\">担当者: {}<br>{}</div>\n</footer>\n",
            escape_html(&record.staff_member),
            format_month_jp(&record.completion_month),
        ));
    }

    html.push_str("</article>\n");
    Ok(html)
}
