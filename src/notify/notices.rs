//! Notice templates for transfer confirmations

use chrono::Utc;
use rust_decimal::Decimal;

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; color: #333;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="background: #1f2937; color: white; padding: 20px; text-align: center;">
      <h1>Online Banking System</h1>
      <h2>{title}</h2>
    </div>
    <div style="padding: 20px; background: #f8f9fa;">
{body}
      <p>If you have any questions about this transaction, please contact our customer service.</p>
    </div>
    <div style="padding: 20px; text-align: center; font-size: 12px; color: #666;">
      <p>This is an automated message. Please do not reply.</p>
    </div>
  </div>
</body>
</html>"#
    )
}

/// Debit notice for the sending side of a transfer.
pub fn debit_notice(
    user_name: &str,
    transfer_kind: &str,
    amount: Decimal,
    masked_account: &str,
    reference: &str,
    remaining_balance: Decimal,
    recipient_masked: Option<&str>,
) -> (String, String) {
    let subject = format!("Transfer Confirmation - ${amount:.2}");
    let date = Utc::now().format("%Y-%m-%d");

    let recipient_line = recipient_masked
        .map(|r| format!("      <p><strong>To Account:</strong> {r}</p>\n"))
        .unwrap_or_default();

    let body = format!(
        "      <p>Dear {user_name},</p>\n\
               <p>Your {transfer_kind} has been submitted. Here are the details:</p>\n\
               <p><strong>Amount:</strong> ${amount:.2}</p>\n\
               <p><strong>From Account:</strong> {masked_account}</p>\n\
         {recipient_line}\
               <p><strong>Reference:</strong> {reference}</p>\n\
               <p><strong>Date:</strong> {date}</p>\n\
               <p><strong>Remaining Balance:</strong> ${remaining_balance:.2}</p>\n"
    );

    (subject, layout("Transfer Confirmation", &body))
}

/// Credit notice for the receiving side of an internal transfer.
pub fn credit_notice(
    user_name: &str,
    amount: Decimal,
    masked_account: &str,
    reference: &str,
) -> (String, String) {
    let subject = "Transaction Confirmation - Incoming Transfer".to_string();
    let date = Utc::now().format("%Y-%m-%d");

    let body = format!(
        "      <p>Dear {user_name},</p>\n\
               <p>You have received a transfer. Here are the details:</p>\n\
               <p><strong>Amount:</strong> ${amount:.2}</p>\n\
               <p><strong>Account:</strong> {masked_account}</p>\n\
               <p><strong>Reference:</strong> {reference}</p>\n\
               <p><strong>Date:</strong> {date}</p>\n"
    );

    (subject, layout("Transaction Confirmation", &body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn test_debit_notice_contents() {
        let (subject, html) = debit_notice(
            "Ada",
            "Internal Transfer",
            dec!(125.5),
            "****1234",
            "TXN-ABC-DEF123",
            dec!(874.5),
            Some("****9876"),
        );
        assert_eq!(subject, "Transfer Confirmation - $125.50");
        assert!(html.contains("Dear Ada"));
        assert!(html.contains("****1234"));
        assert!(html.contains("****9876"));
        assert!(html.contains("TXN-ABC-DEF123"));
        assert!(html.contains("$874.50"));
    }

    #[test]
    fn test_debit_notice_without_recipient() {
        let (_, html) = debit_notice(
            "Ada",
            "External Transfer",
            dec!(100),
            "****1234",
            "TXN-X-Y",
            dec!(0),
            None,
        );
        assert!(!html.contains("To Account"));
    }

    #[test]
    fn test_credit_notice_contents() {
        let (subject, html) = credit_notice("Grace", dec!(1000), "****4321", "TXN-1-2");
        assert!(subject.contains("Incoming Transfer"));
        assert!(html.contains("Dear Grace"));
        assert!(html.contains("$1000.00"));
    }
}
