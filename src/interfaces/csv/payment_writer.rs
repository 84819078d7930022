use crate::domain::payment::Payment;
use crate::error::{PaymentError, Result};
use serde::Serialize;
use std::io::Write;

/// One output row per stored payment.
#[derive(Debug, Serialize)]
struct PaymentRow<'a> {
    pid: u64,
    status: &'static str,
    amount: String,
    currency: &'a str,
    braintree_id: &'a str,
    r#type: &'a str,
}

impl<'a> TryFrom<&'a Payment> for PaymentRow<'a> {
    type Error = PaymentError;

    fn try_from(payment: &'a Payment) -> Result<Self> {
        let metadata = payment.braintree.as_ref();
        Ok(Self {
            pid: payment.pid.unwrap_or_default(),
            status: payment.status().as_str(),
            amount: payment.total_amount()?.to_string(),
            currency: &payment.currency_code,
            braintree_id: metadata.map_or("", |m| m.braintree_id.as_str()),
            r#type: metadata.map_or("", |m| m.r#type.as_str()),
        })
    }
}

/// Writes payments as CSV to any `Write` sink (e.g., Stdout, File).
pub struct PaymentWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PaymentWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        Self { writer }
    }

    /// Writes the header followed by one row per payment, in the given order.
    pub fn write_payments<'a>(
        &mut self,
        payments: impl IntoIterator<Item = &'a Payment>,
    ) -> Result<()> {
        self.writer.write_record(PaymentRow::HEADER)?;
        for payment in payments {
            self.writer.serialize(PaymentRow::try_from(payment)?)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

impl PaymentRow<'_> {
    const HEADER: [&'static str; 6] = [
        "pid",
        "status",
        "amount",
        "currency",
        "braintree_id",
        "type",
    ];
}
