//! JSON documents exchanged with the host: payments, contexts, form output.

use crate::domain::payment::Payment;
use crate::error::Result;
use crate::infrastructure::in_memory::MapContext;
use serde::Serialize;
use std::io::{Read, Write};

pub fn read_payment<R: Read>(source: R) -> Result<Payment> {
    Ok(serde_json::from_reader(source)?)
}

pub fn read_context<R: Read>(source: R) -> Result<MapContext> {
    Ok(serde_json::from_reader(source)?)
}

pub fn write_pretty<W: Write, T: Serialize>(mut sink: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut sink, value)?;
    writeln!(sink)?;
    Ok(())
}
