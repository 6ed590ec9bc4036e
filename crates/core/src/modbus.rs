//! Wire transport abstraction for field devices and the panel HMI server
//! (§6 External Interfaces).
//!
//! The original talks to both sides through Arduino's `ModbusClient` and
//! `MgsModbus` directly inside `Fncs.cpp`; here that's replaced by two small
//! traits so the engine in [`crate::pipeline`]/[`crate::hmi`] never depends
//! on a live socket, with [`TcpFieldTransport`] as the real implementation
//! over `tokio-modbus` (the transport is an explicit Non-goal of the core
//! engine, so only a thin adapter lives here).

use std::net::SocketAddr;

use tokio_modbus::client::{tcp, Context};
use tokio_modbus::prelude::*;

use crate::error::{FieldError, FieldResult};

/// Which Modbus register table an operation targets (`GenericPrgDeviceHwEnum`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Coil,
    Input,
    Hold,
    Discrete,
}

/// Everything a field device read/write pass needs from the wire.
pub trait FieldTransport {
    async fn read_bits(&mut self, unit: u8, table: Table, addr: u16, count: u16) -> FieldResult<Vec<bool>>;
    async fn read_words(&mut self, unit: u8, table: Table, addr: u16, count: u16) -> FieldResult<Vec<u16>>;
    async fn write_coil(&mut self, unit: u8, addr: u16, value: bool) -> FieldResult<()>;
    async fn write_holding_register(&mut self, unit: u8, addr: u16, value: u16) -> FieldResult<()>;
}

/// The panel-facing half: a Modbus/TCP server the HMI polls, exposing a
/// flat register file (`MgsModbus::MbData`).
pub trait PanelTransport {
    async fn read_register(&mut self, area: u16) -> FieldResult<i64>;
    async fn write_register(&mut self, area: u16, value: i64) -> FieldResult<()>;
}

/// A field gateway reached over Modbus/TCP via `tokio-modbus`.
pub struct TcpFieldTransport {
    ctx: Context,
}

impl TcpFieldTransport {
    pub async fn connect(addr: SocketAddr) -> FieldResult<Self> {
        let ctx = tcp::connect(addr).await.map_err(|_| FieldError::TransportFault)?;
        Ok(Self { ctx })
    }

    fn slave(&mut self, unit: u8) {
        self.ctx.set_slave(Slave(unit));
    }
}

impl FieldTransport for TcpFieldTransport {
    async fn read_bits(&mut self, unit: u8, table: Table, addr: u16, count: u16) -> FieldResult<Vec<bool>> {
        self.slave(unit);
        let result = match table {
            Table::Coil => self.ctx.read_coils(addr, count).await,
            Table::Discrete => self.ctx.read_discrete_inputs(addr, count).await,
            _ => return Err(FieldError::ConfigFault),
        };
        result.map_err(|_| FieldError::TransportFault)?.map_err(|_| FieldError::TransportFault)
    }

    async fn read_words(&mut self, unit: u8, table: Table, addr: u16, count: u16) -> FieldResult<Vec<u16>> {
        self.slave(unit);
        let result = match table {
            Table::Hold => self.ctx.read_holding_registers(addr, count).await,
            Table::Input => self.ctx.read_input_registers(addr, count).await,
            _ => return Err(FieldError::ConfigFault),
        };
        result.map_err(|_| FieldError::TransportFault)?.map_err(|_| FieldError::TransportFault)
    }

    async fn write_coil(&mut self, unit: u8, addr: u16, value: bool) -> FieldResult<()> {
        self.slave(unit);
        self.ctx
            .write_single_coil(addr, value)
            .await
            .map_err(|_| FieldError::TransportFault)?
            .map_err(|_| FieldError::TransportFault)
    }

    async fn write_holding_register(&mut self, unit: u8, addr: u16, value: u16) -> FieldResult<()> {
        self.slave(unit);
        self.ctx
            .write_single_register(addr, value)
            .await
            .map_err(|_| FieldError::TransportFault)?
            .map_err(|_| FieldError::TransportFault)
    }
}

/// The HMI panel itself holds the Modbus/TCP server endpoint (§6); this is
/// the client side that dials it, one holding register per buffer area.
pub struct TcpPanelTransport {
    ctx: Context,
}

impl TcpPanelTransport {
    pub async fn connect(addr: SocketAddr) -> FieldResult<Self> {
        let ctx = tcp::connect(addr).await.map_err(|_| FieldError::TransportFault)?;
        Ok(Self { ctx })
    }
}

impl PanelTransport for TcpPanelTransport {
    async fn read_register(&mut self, area: u16) -> FieldResult<i64> {
        let words = self.ctx.read_holding_registers(area, 1).await.map_err(|_| FieldError::TransportFault)?.map_err(|_| FieldError::TransportFault)?;
        Ok(*words.first().unwrap_or(&0) as i64)
    }

    async fn write_register(&mut self, area: u16, value: i64) -> FieldResult<()> {
        self.ctx
            .write_single_register(area, value as u16)
            .await
            .map_err(|_| FieldError::TransportFault)?
            .map_err(|_| FieldError::TransportFault)
    }
}
