//! Test doubles for the delay provider and for misbehaving buses.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

use embassy_futures::yield_now;
use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

/// A delay that never elapses.
#[derive(Clone, Copy)]
pub struct NeverDelay;

impl DelayNs for NeverDelay {
    async fn delay_ns(&mut self, _ns: u32) {
        core::future::pending::<()>().await
    }

    async fn delay_us(&mut self, _us: u32) {
        core::future::pending::<()>().await
    }
}

/// A delay that elapses as soon as it is polled.
#[derive(Clone, Copy)]
pub struct ReadyDelay;

impl DelayNs for ReadyDelay {
    async fn delay_ns(&mut self, _ns: u32) {}

    async fn delay_us(&mut self, _us: u32) {}
}

/// A delay that elapses immediately and records every requested duration
/// in microseconds. Clones share the log.
#[derive(Clone, Default)]
pub struct RecordingDelay {
    log: Rc<RefCell<Vec<u32>>>,
}

impl RecordingDelay {
    pub fn requests(&self) -> Vec<u32> {
        self.log.borrow().clone()
    }
}

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().push(ns / 1_000);
    }

    async fn delay_us(&mut self, us: u32) {
        self.log.borrow_mut().push(us);
    }
}

/// Simulated time advanced by the timers themselves.
const TICK_NS: u64 = 100_000;

/// A delay on a shared virtual clock. Every poll of a pending timer moves
/// the clock forward by one tick, so among timers polled together the
/// shortest one elapses first. Clones share the clock.
#[derive(Clone, Default)]
pub struct TickingDelay {
    now_ns: Rc<Cell<u64>>,
}

impl DelayNs for TickingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        let deadline = self.now_ns.get() + u64::from(ns);
        while self.now_ns.get() < deadline {
            self.now_ns.set(self.now_ns.get() + TICK_NS);
            yield_now().await;
        }
    }

    async fn delay_us(&mut self, us: u32) {
        self.delay_ns(us.saturating_mul(1_000)).await
    }
}

/// A bus whose transactions need one wake-up and then fail. Counts started
/// and finished transactions.
#[derive(Default)]
pub struct SlowFailingI2c {
    pub started: Cell<u32>,
    pub finished: Cell<u32>,
}

impl ErrorType for SlowFailingI2c {
    type Error = ErrorKind;
}

impl I2c for SlowFailingI2c {
    async fn transaction(
        &mut self,
        _address: u8,
        _operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.started.set(self.started.get() + 1);
        yield_now().await;
        self.finished.set(self.finished.get() + 1);
        Err(ErrorKind::Other)
    }
}

/// A bus whose transactions never complete.
pub struct StallingI2c;

impl ErrorType for StallingI2c {
    type Error = ErrorKind;
}

impl I2c for StallingI2c {
    async fn transaction(
        &mut self,
        _address: u8,
        _operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        core::future::pending().await
    }
}
