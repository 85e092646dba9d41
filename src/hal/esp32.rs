//! ESP32 pin bank over raw ESP-IDF GPIO and LEDC calls.
//!
//! The IR carrier is an LEDC channel running at the tick frequency with 50%
//! duty; "carrier off" sets the duty to zero. Calls here are ISR-safe
//! register writes, nothing blocks.

use esp_idf_svc::sys::{self, esp, EspError};

use super::PinBank;
use crate::config::Config;

const LEDC_MODE: sys::ledc_mode_t = sys::ledc_mode_t_LEDC_LOW_SPEED_MODE;
const LEDC_CHANNEL: sys::ledc_channel_t = sys::ledc_channel_t_LEDC_CHANNEL_0;
const LEDC_TIMER: sys::ledc_timer_t = sys::ledc_timer_t_LEDC_TIMER_0;

/// 8-bit duty resolution, 50%.
const CARRIER_DUTY: u32 = 128;

/// Pin bank for ESP32-S3 GPIOs.
pub struct EspPinBank {
    ir: i32,
    tx: Option<i32>,
    rx: Option<i32>,
    modulated: bool,
    ir_released: bool,
}

impl EspPinBank {
    /// Configure every pin named in `config`.
    ///
    /// IR starts released, TX idles high, RX is an input with pull-up.
    pub fn new(config: &Config) -> Result<Self, EspError> {
        let ir = config.ir_pin as i32;

        if config.modulated {
            let timer = sys::ledc_timer_config_t {
                speed_mode: LEDC_MODE,
                duty_resolution: sys::ledc_timer_bit_t_LEDC_TIMER_8_BIT,
                timer_num: LEDC_TIMER,
                freq_hz: config.carrier_hz(),
                ..Default::default()
            };
            // SAFETY: plain driver calls with valid config structs
            unsafe {
                esp!(sys::ledc_timer_config(&timer))?;
            }

            let channel = sys::ledc_channel_config_t {
                gpio_num: ir,
                speed_mode: LEDC_MODE,
                channel: LEDC_CHANNEL,
                timer_sel: LEDC_TIMER,
                duty: 0,
                hpoint: 0,
                ..Default::default()
            };
            unsafe {
                esp!(sys::ledc_channel_config(&channel))?;
            }
        } else {
            unsafe {
                esp!(sys::gpio_reset_pin(ir))?;
            }
        }

        let tx = config.tx_pin.map(|p| p as i32);
        let rx = config.rx_pin.map(|p| p as i32);

        unsafe {
            if let Some(tx) = tx {
                esp!(sys::gpio_reset_pin(tx))?;
                esp!(sys::gpio_set_direction(tx, sys::gpio_mode_t_GPIO_MODE_OUTPUT))?;
                esp!(sys::gpio_set_level(tx, 1))?;
            }
            if let Some(rx) = rx {
                esp!(sys::gpio_reset_pin(rx))?;
                esp!(sys::gpio_set_direction(rx, sys::gpio_mode_t_GPIO_MODE_INPUT))?;
                esp!(sys::gpio_set_pull_mode(rx, sys::gpio_pull_mode_t_GPIO_PULLUP_ONLY))?;
            }
        }

        let mut pins = Self {
            ir,
            tx,
            rx,
            modulated: config.modulated,
            ir_released: false,
        };
        pins.ir_release();
        Ok(pins)
    }

    /// Receive pin, if configured.
    pub fn rx_pin(&self) -> Option<i32> {
        self.rx
    }

    #[inline]
    fn ir_reclaim(&mut self) {
        if self.ir_released {
            // SAFETY: register write on a pin this bank owns
            unsafe {
                sys::gpio_set_direction(self.ir, sys::gpio_mode_t_GPIO_MODE_OUTPUT);
            }
            self.ir_released = false;
        }
    }
}

impl PinBank for EspPinBank {
    #[inline]
    fn ir_carrier(&mut self, on: bool) {
        self.ir_reclaim();
        let duty = if on { CARRIER_DUTY } else { 0 };
        unsafe {
            sys::ledc_set_duty(LEDC_MODE, LEDC_CHANNEL, duty);
            sys::ledc_update_duty(LEDC_MODE, LEDC_CHANNEL);
        }
    }

    #[inline]
    fn ir_drive(&mut self, high: bool) {
        self.ir_reclaim();
        unsafe {
            sys::gpio_set_level(self.ir, high as u32);
        }
    }

    fn ir_release(&mut self) {
        unsafe {
            if self.modulated {
                sys::ledc_set_duty(LEDC_MODE, LEDC_CHANNEL, 0);
                sys::ledc_update_duty(LEDC_MODE, LEDC_CHANNEL);
            }
            sys::gpio_set_direction(self.ir, sys::gpio_mode_t_GPIO_MODE_INPUT);
            sys::gpio_set_pull_mode(self.ir, sys::gpio_pull_mode_t_GPIO_FLOATING);
        }
        self.ir_released = true;
    }

    #[inline]
    fn tx_write(&mut self, high: bool) {
        if let Some(tx) = self.tx {
            unsafe {
                sys::gpio_set_level(tx, high as u32);
            }
        }
    }

    #[inline]
    fn rx_read(&mut self) -> bool {
        match self.rx {
            Some(rx) => unsafe { sys::gpio_get_level(rx) != 0 },
            None => true,
        }
    }
}
