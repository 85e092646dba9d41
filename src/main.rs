//! TinyIrUart firmware for ESP32-S3.
//!
//! 1. Bring up the log UART (UART1 TX on GPIO6)
//! 2. Configure IR/UART pins and hand them to the tick ISR
//! 3. Start the GPTimer tick and the RX falling-edge interrupt
//! 4. Background loop: echo received bytes, send a demo IR frame every
//!    second, report faults, drain logs

#![no_std]
#![no_main]

use core::cell::UnsafeCell;
use core::ffi::c_void;
use core::ptr;

use esp_idf_svc::hal::gpio;
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::uart::{self, UartTxDriver};
use esp_idf_svc::sys as esp_idf_sys;
use esp_idf_svc::sys::{esp, EspError};

use tiny_ir_uart::hal::esp32::EspPinBank;
use tiny_ir_uart::uart::TX_SLOT_SIZE;
use tiny_ir_uart::{log_drain, rt_error, rt_info, rt_warn};
use tiny_ir_uart::logging::LogLevel;
use tiny_ir_uart::{Config, RcFrame, TinyIrUart, BG_LOG_STREAM, ISR_LOG_STREAM};

// Wrapper to make UnsafeCell Sync for the ISR-owned pin bank.
// SAFETY: Written once before the tick timer starts, then touched only
// from the tick ISR.
#[repr(transparent)]
struct SyncCell<T>(UnsafeCell<T>);
unsafe impl<T> Sync for SyncCell<T> {}

impl<T> SyncCell<T> {
    const fn new(value: T) -> Self {
        Self(UnsafeCell::new(value))
    }
}

const CONFIG: Config = Config::DEFAULT;

/// GPTimer counts at 10 MHz, so one tick is `tick_period_ns / 100` counts.
const TIMER_RESOLUTION_HZ: u32 = 10_000_000;

/// Log UART baud rate.
const LOG_BAUD: u32 = 115_200;

/// Background loop period in FreeRTOS ticks.
const LOOP_DELAY: u32 = 10;

/// Loop iterations between demo IR frames.
const DEMO_EVERY: u32 = 10;

static ENGINE: TinyIrUart = TinyIrUart::new(CONFIG);
static PINS: SyncCell<Option<EspPinBank>> = SyncCell::new(None);

/// Log sink over the UART1 TX driver.
struct LogUart<'d>(UartTxDriver<'d>);

impl core::fmt::Write for LogUart<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.0
            .write(s.as_bytes())
            .map(|_| ())
            .map_err(|_| core::fmt::Error)
    }
}

#[no_mangle]
fn main() {
    // Initialize ESP-IDF
    esp_idf_sys::link_patches();

    let Ok(peripherals) = Peripherals::take() else {
        restart();
    };
    let Ok(uart) = init_log_uart(peripherals.uart1, peripherals.pins.gpio6) else {
        restart();
    };
    let mut sink = LogUart(uart);

    rt_info!(BG_LOG_STREAM, 0, "{}", env!("VERSION_STRING"));

    // Per-frame completions would flood the log UART during echo
    ISR_LOG_STREAM.set_min_level(LogLevel::Info);

    if let Err(e) = start_engine(&CONFIG) {
        rt_error!(BG_LOG_STREAM, 0, "init failed: {}", e);
        log_drain::drain_logs(&mut sink);
        restart();
    }

    background_loop(&mut sink)
}

fn restart() -> ! {
    unsafe { esp_idf_sys::esp_restart() }
}

/// UART1 TX-only on GPIO6 for log output.
fn init_log_uart<'d>(
    uart: impl Peripheral<P = uart::UART1> + 'd,
    tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
) -> Result<UartTxDriver<'d>, EspError> {
    let uart_config = uart::config::Config::default()
        .baudrate(esp_idf_svc::hal::units::Hertz(LOG_BAUD));

    UartTxDriver::new(
        uart,
        tx_pin,
        Option::<gpio::AnyIOPin>::None, // CTS
        Option::<gpio::AnyIOPin>::None, // RTS
        &uart_config,
    )
}

/// Tick ISR: one engine tick per timer alarm.
unsafe extern "C" fn on_tick(
    _timer: esp_idf_sys::gptimer_handle_t,
    _event: *const esp_idf_sys::gptimer_alarm_event_data_t,
    _ctx: *mut c_void,
) -> bool {
    // SAFETY: PINS is only touched here once the timer runs
    if let Some(pins) = (*PINS.0.get()).as_mut() {
        ENGINE.tick(pins);
    }
    false
}

/// RX falling-edge ISR.
unsafe extern "C" fn on_rx_edge(_arg: *mut c_void) {
    ENGINE.on_rx_edge();
}

fn start_engine(config: &Config) -> Result<(), EspError> {
    if let Err(e) = config.validate() {
        rt_error!(BG_LOG_STREAM, 0, "config: {}", e);
        esp!(esp_idf_sys::ESP_ERR_INVALID_ARG as esp_idf_sys::esp_err_t)?;
    }

    let pins = EspPinBank::new(config)?;
    let rx_pin = pins.rx_pin();

    // SAFETY: the tick timer is not running yet
    unsafe {
        *PINS.0.get() = Some(pins);
    }

    if let Some(rx) = rx_pin {
        unsafe {
            esp!(esp_idf_sys::gpio_set_intr_type(
                rx,
                esp_idf_sys::gpio_int_type_t_GPIO_INTR_NEGEDGE
            ))?;
            esp!(esp_idf_sys::gpio_install_isr_service(0))?;
            esp!(esp_idf_sys::gpio_isr_handler_add(rx, Some(on_rx_edge), ptr::null_mut()))?;
        }
    }

    let timer_config = esp_idf_sys::gptimer_config_t {
        clk_src: esp_idf_sys::soc_periph_gptimer_clk_src_t_GPTIMER_CLK_SRC_DEFAULT,
        direction: esp_idf_sys::gptimer_count_direction_t_GPTIMER_COUNT_UP,
        resolution_hz: TIMER_RESOLUTION_HZ,
        ..Default::default()
    };
    let mut alarm = esp_idf_sys::gptimer_alarm_config_t {
        alarm_count: (config.tick_period_ns() / 100) as u64,
        reload_count: 0,
        ..Default::default()
    };
    alarm.flags.set_auto_reload_on_alarm(1);
    let callbacks = esp_idf_sys::gptimer_event_callbacks_t {
        on_alarm: Some(on_tick),
    };

    let mut timer: esp_idf_sys::gptimer_handle_t = ptr::null_mut();
    unsafe {
        esp!(esp_idf_sys::gptimer_new_timer(&timer_config, &mut timer))?;
        esp!(esp_idf_sys::gptimer_register_event_callbacks(
            timer,
            &callbacks,
            ptr::null_mut()
        ))?;
        esp!(esp_idf_sys::gptimer_set_alarm_action(timer, &alarm))?;
        esp!(esp_idf_sys::gptimer_enable(timer))?;
        esp!(esp_idf_sys::gptimer_start(timer))?;
    }

    rt_info!(
        BG_LOG_STREAM,
        ENGINE.ticks(),
        "tick {}ns, {} baud",
        config.tick_period_ns(),
        config.baud_rate()
    );
    Ok(())
}

fn background_loop(sink: &mut LogUart<'_>) -> ! {
    let mut echo = [0u8; TX_SLOT_SIZE];
    let mut iteration = 0u32;
    let mut toggle = false;

    loop {
        // Echo received bytes once the previous echo is out
        if ENGINE.bytes_remaining_to_transmit() == 0 {
            let mut n = 0;
            while n < echo.len() {
                match ENGINE.receive_byte() {
                    Some(b) => {
                        echo[n] = b;
                        n += 1;
                    }
                    None => break,
                }
            }
            if n > 0 {
                let _ = ENGINE.start_transmit(&echo[..n]);
            }
        }

        // Alternate NEC and RC5 demo frames
        if iteration % DEMO_EVERY == 0 && ENGINE.is_waveform_free() {
            let _ = if (iteration / DEMO_EVERY) % 2 == 0 {
                ENGINE.send_nec(0x04, 0x08)
            } else {
                toggle = !toggle;
                ENGINE.send_rc(&RcFrame::rc5(0x05, 0x0C, toggle))
            };
        }

        if let Some(fault) = ENGINE.fault().take() {
            rt_warn!(
                BG_LOG_STREAM,
                ENGINE.ticks(),
                "fault {:?} data={} count={}",
                fault.code,
                fault.data,
                fault.count
            );
        }

        log_drain::drain_logs(sink);

        iteration = iteration.wrapping_add(1);
        unsafe {
            esp_idf_sys::vTaskDelay(LOOP_DELAY);
        }
    }
}
