//! Built-in command handlers occupying ids 0x00-0x0F

use ssc_hal::Transport;
use ssc_protocol::messages::{
    BUILTIN_COMMAND_COUNT, CMD_DEVICE_INFO, CMD_DEVICE_NAME, CMD_RESET, PROTOCOL_VERSION,
};
use ssc_protocol::DeviceMessage;

use super::handlers::{Handler, HandlerTable};
use super::Device;

/// Table holding exactly the built-in slots
pub(crate) fn table<T: Transport>() -> HandlerTable<T> {
    let mut table = HandlerTable::new();
    for command in 0..BUILTIN_COMMAND_COUNT {
        let handler: Handler<T> = match command {
            CMD_DEVICE_INFO => Handler::Command(device_info::<T>),
            CMD_DEVICE_NAME => Handler::Command(device_name::<T>),
            CMD_RESET => Handler::Command(reset::<T>),
            _ => Handler::Noop,
        };
        table.register(handler);
    }
    table
}

/// Reply with id, protocol version and firmware version
fn device_info<T: Transport>(device: &mut Device<T>, _a: u8, _b: u8, _c: u8) {
    let config = device.config();
    let reply = DeviceMessage::DeviceInfo {
        device_id: config.device_id,
        protocol_version: PROTOCOL_VERSION,
        device_version: config.device_version,
    };
    device.send_message(&reply);
}

/// Deposit the device name, then announce its address
fn device_name<T: Transport>(device: &mut Device<T>, _a: u8, _b: u8, _c: u8) {
    let name = device.config().name.clone();
    match device.write_buffer(name.as_bytes()) {
        Ok(address) => device.send_message(&DeviceMessage::DeviceName { address }),
        Err(e) => warn!("device name not sent: {}", e),
    }
}

/// Drop every managed buffer and restart address allocation
fn reset<T: Transport>(device: &mut Device<T>, _a: u8, _b: u8, _c: u8) {
    device.reset();
}
