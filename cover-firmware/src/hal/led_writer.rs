// SmartLED Writer für die Status-LED (WS2812 über RMT)
use cover_core::{CoverError, LedError, SmartLedWriter};
use defmt::{Debug2Format, error};
use esp_hal::Blocking;
use esp_hal::rmt::{PulseCode, Rmt};
use esp_hal::time::Rate;
use esp_hal_smartled::SmartLedsAdapter;
use rgb::RGB8;
use smart_leds_trait::SmartLedsWrite;

/// Buffer-Größe für 1 LED (3 Farben * 8 Bits + 1 Reset)
pub const LED_BUFFER_SIZE: usize = 25;

/// Status-LED am RMT Peripheral
///
/// Der Buffer muss länger leben als der Writer, daher wird er im Task
/// mit `smart_led_buffer!(1)` angelegt und hier nur geliehen.
pub struct RmtLedWriter<'a> {
    led: SmartLedsAdapter<'a, LED_BUFFER_SIZE>,
}

impl<'a> RmtLedWriter<'a> {
    /// Initialisiert RMT + SmartLED Adapter
    ///
    /// Schlägt die RMT-Initialisierung fehl, ist das ein Init-Fehler
    /// des Geräts (Aufrufer startet neu).
    pub fn new(
        gpio8: esp_hal::peripherals::GPIO8<'a>,
        rmt_peripheral: esp_hal::peripherals::RMT<'a>,
        rmt_clock_mhz: u32,
        buffer: &'a mut [PulseCode; LED_BUFFER_SIZE],
    ) -> Result<Self, CoverError> {
        let rmt: Rmt<'a, Blocking> = Rmt::new(rmt_peripheral, Rate::from_mhz(rmt_clock_mhz))
            .map_err(|e| {
                error!("LED: RMT init failed: {}", Debug2Format(&e));
                CoverError::InitFailure
            })?;

        let led = SmartLedsAdapter::new(rmt.channel0, gpio8, buffer);

        Ok(Self { led })
    }
}

impl SmartLedWriter for RmtLedWriter<'_> {
    fn write(&mut self, color: RGB8) -> Result<(), LedError> {
        self.led
            .write([color].into_iter())
            .map_err(|_| LedError::WriteFailed)
    }
}
