#![no_std]
#![no_main]

use core::cell::Cell;
use pipe_temps::{
    Clock, Firmware, Instant, MinimalConfig, NetworkLink, PublishClient, SensorAddress,
    TemperatureBus, Transport,
};
use panic_halt as _;

// Single fixed probe - measures only the sampling path
pub struct StubBus;

impl TemperatureBus for StubBus {
    type Error = ();

    fn device_count(&mut self) -> Result<usize, ()> {
        Ok(1)
    }

    fn device_address(&mut self, _index: usize) -> Result<Option<SensorAddress>, ()> {
        Ok(Some([0x28, 0, 0, 0, 0, 0, 0, 0x01]))
    }

    fn request_conversion(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn read_celsius(&mut self, _address: &SensorAddress) -> Result<f32, ()> {
        Ok(core::hint::black_box(21.5))
    }
}

// Client that accepts everything and sends nothing
pub struct StubClient {
    connected: bool,
}

impl PublishClient for StubClient {
    type Error = ();

    fn connect(&mut self, _client_id: &str, _user: &str, _password: &str) -> nb::Result<(), ()> {
        self.connected = true;
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), ()> {
        core::hint::black_box((topic, payload));
        Ok(())
    }

    fn poll(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn last_error_code(&self) -> i32 {
        0
    }
}

pub struct StubTransport;

impl NetworkLink for StubTransport {
    fn is_link_up(&self) -> bool {
        true
    }
}

impl Transport for StubTransport {
    type Client = StubClient;
    type Error = ();

    fn open(&mut self) -> Result<StubClient, ()> {
        Ok(StubClient { connected: false })
    }
}

// Advances 1 ms per read in place of a hardware timer
pub struct TickClock {
    ticks: Cell<u32>,
}

impl Clock for TickClock {
    fn now(&self) -> Instant {
        let now = self.ticks.get();
        self.ticks.set(now.wrapping_add(1));
        Instant::from_millis(now)
    }
}

// Entry point
#[cortex_m_rt::entry]
fn main() -> ! {
    let clock = TickClock {
        ticks: Cell::new(0),
    };

    let mut firmware: Firmware<_, _, _, MinimalConfig, 4, 3> =
        Firmware::start(StubBus, StubTransport, clock);

    // Use black_box to prevent optimizer from removing the code
    loop {
        let _ = core::hint::black_box(firmware.run_once());
        cortex_m::asm::nop();
    }
}

// Required: exception handler
#[cortex_m_rt::exception]
unsafe fn HardFault(_ef: &cortex_m_rt::ExceptionFrame) -> ! {
    loop {
        cortex_m::asm::nop();
    }
}
