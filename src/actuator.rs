use crate::signal::Signal;

/// Consumer of classified signals, e.g. LEDs and a buzzer.
///
/// Called exactly once for every read that yields a signal and never for reads
/// that are empty, headerless, or carry no payload.
#[allow(async_fn_in_trait)]
pub trait Actuator {
    async fn on_signal(&mut self, signal: Signal);
}

impl<T: Actuator + ?Sized> Actuator for &mut T {
    async fn on_signal(&mut self, signal: Signal) {
        (**self).on_signal(signal).await
    }
}
