use shared::utils::validation::sanitize_html;

use crate::domain::order::CustomOrder;
use crate::domain::quotation::Quotation;
use crate::utils::email::OutgoingEmail;

// Data yang dirender ke email quotation / reminder
#[derive(Debug, Clone)]
pub struct QuotationEmailContext<'a> {
    pub company_name: &'a str,
    pub order: &'a CustomOrder,
    pub quotation: &'a Quotation,
    pub message: Option<&'a str>,
}

fn layout(company_name: &str, title: &str, body: &str) -> String {
    format!(
        r#"
        <!DOCTYPE html>
        <html>
        <head>
            <meta charset="UTF-8">
            <style>
                body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
                .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
                .header {{ background: #2F855A; color: white; padding: 20px; text-align: center; }}
                .content {{ background: #f9fafb; padding: 30px; }}
                .summary td {{ padding: 6px 12px; }}
                .note {{ background: white; border-left: 4px solid #2F855A; padding: 12px; margin: 20px 0; }}
                .footer {{ text-align: center; padding: 20px; color: #666; font-size: 12px; }}
            </style>
        </head>
        <body>
            <div class="container">
                <div class="header">
                    <h1>{title}</h1>
                </div>
                <div class="content">
                    {body}
                </div>
                <div class="footer">
                    <p>Email otomatis dari {company}, balas email ini untuk pertanyaan.</p>
                </div>
            </div>
        </body>
        </html>
        "#,
        title = title,
        body = body,
        company = company_name,
    )
}

fn summary_table(quotation: &Quotation) -> String {
    format!(
        r#"
                    <table class="summary">
                        <tr><td>Reference</td><td><strong>{}</strong></td></tr>
                        <tr><td>Total</td><td>{}</td></tr>
                        <tr><td>Sudah dibayar</td><td>{}</td></tr>
                        <tr><td>Sisa tagihan</td><td><strong>{}</strong></td></tr>
                        <tr><td>Berlaku sampai</td><td>{}</td></tr>
                    </table>
        "#,
        sanitize_html(&quotation.bill_reference),
        quotation.total_amount,
        quotation.received_amount,
        quotation.balance(),
        quotation.valid_until.format("%d %B %Y"),
    )
}

fn note_block(message: Option<&str>) -> String {
    match message.map(str::trim).filter(|m| !m.is_empty()) {
        Some(message) => format!(r#"<div class="note"><p>{}</p></div>"#, sanitize_html(message)),
        None => String::new(),
    }
}

/// Email quotation resmi ke customer
pub fn quotation_email(ctx: &QuotationEmailContext<'_>) -> OutgoingEmail {
    let company = sanitize_html(ctx.company_name);
    let body = format!(
        r#"
                    <p>Halo <strong>{contact}</strong>,</p>
                    <p>Terima kasih atas permintaan custom order dari {customer} untuk {quantity} unit {product}.</p>
                    <p>Berikut quotation kami:</p>
                    {summary}
                    {note}
                    <p>Silakan hubungi kami untuk konfirmasi order atau pertanyaan lain.</p>
        "#,
        contact = sanitize_html(&ctx.order.contact_name),
        customer = sanitize_html(&ctx.order.company_name),
        quantity = ctx.order.quantity,
        product = sanitize_html(&ctx.order.product_type),
        summary = summary_table(ctx.quotation),
        note = note_block(ctx.message.or(ctx.quotation.notes.as_deref())),
    );

    OutgoingEmail {
        to: ctx.order.email.clone(),
        subject: format!(
            "Quotation {} - {}",
            ctx.quotation.bill_reference, ctx.company_name
        ),
        html: layout(&company, "Quotation Custom Order", &body),
    }
}

/// Email reminder untuk quotation yang belum lunas
pub fn reminder_email(ctx: &QuotationEmailContext<'_>) -> OutgoingEmail {
    let company = sanitize_html(ctx.company_name);
    let body = format!(
        r#"
                    <p>Halo <strong>{contact}</strong>,</p>
                    <p>Kami ingin mengingatkan quotation untuk custom order {customer} masih menunggu pembayaran.</p>
                    {summary}
                    {note}
                    <p>Abaikan email ini jika pembayaran sudah dilakukan.</p>
        "#,
        contact = sanitize_html(&ctx.order.contact_name),
        customer = sanitize_html(&ctx.order.company_name),
        summary = summary_table(ctx.quotation),
        note = note_block(ctx.message),
    );

    OutgoingEmail {
        to: ctx.order.email.clone(),
        subject: format!(
            "Reminder: Quotation {} - {}",
            ctx.quotation.bill_reference, ctx.company_name
        ),
        html: layout(&company, "Reminder Pembayaran", &body),
    }
}
