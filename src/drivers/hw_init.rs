//! One-shot hardware peripheral initialization and pin handles.
//!
//! Configures ADC1 channels, the water-probe inputs, and the LEDC timer
//! using raw ESP-IDF sys calls.  Called once from `main()` before the
//! control loop starts.  Actuator pins come from configuration, so they
//! are claimed later through [`GpioOutput::new`] and [`LedcOutput::new`],
//! which hand out `embedded-hal` pin types to the drivers.
//!
//! On the host every helper is an in-memory stand-in.

use core::convert::Infallible;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU64, Ordering};

use embedded_hal::digital::{self, InputPin, OutputPin, StatefulOutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

use crate::error::HwInitError;
#[cfg(target_os = "espidf")]
use crate::pins;

/// LEDC channel driving the pump MOSFET.
pub const LEDC_CH_PUMP: u32 = 0;
/// Low-speed LEDC channels available on the ESP32.
pub const LEDC_CHANNEL_COUNT: u32 = 8;
/// All PWM outputs run at 8-bit resolution.
pub const LEDC_MAX_DUTY: u16 = 255;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio_inputs()?;
        init_ledc_timer()?;
    }
    configure_output(pins::SOIL_VCC_GPIO)?;
    gpio_write(pins::SOIL_VCC_GPIO, false);
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.  No concurrent access is possible because
/// `init_adc()` completes before the control loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    for channel in [pins::SOIL_ADC_CHANNEL, pins::BATTERY_ADC_CHANNEL] {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::AdcInitFailed(ret));
        }
    }

    info!(
        "hw_init: ADC1 configured (CH{}=soil, CH{}=battery)",
        pins::SOIL_ADC_CHANNEL,
        pins::BATTERY_ADC_CHANNEL
    );
    Ok(())
}

/// One 12-bit sample, or `None` if the driver reported an error.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> Option<u16> {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract — single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        log::error!("hw_init: ADC1 CH{channel} read failed (rc={ret})");
        return None;
    }
    Some(raw.max(0) as u16)
}

// ── GPIO ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    for &pin in &pins::WATER_LEVEL_GPIOS {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }

    info!("hw_init: water level inputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: u8) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    (unsafe { gpio_get_level(i32::from(pin)) }) != 0
}

#[cfg(target_os = "espidf")]
pub fn configure_output(pin: u8) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: gpio_config only touches the pin named in the mask.
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn configure_output(_pin: u8) -> Result<(), HwInitError> {
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: u8, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    // Main-loop only.
    unsafe {
        gpio_set_level(i32::from(pin), u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: u8, _high: bool) {}

/// Push-pull digital output claimed at runtime.
#[derive(Debug)]
pub struct GpioOutput {
    pin: u8,
    high: bool,
}

impl GpioOutput {
    /// Configure `pin` as an output and drive it low.
    pub fn new(pin: u8) -> Result<Self, HwInitError> {
        configure_output(pin)?;
        gpio_write(pin, false);
        Ok(Self { pin, high: false })
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }
}

impl digital::ErrorType for GpioOutput {
    type Error = Infallible;
}

impl OutputPin for GpioOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.pin, false);
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.pin, true);
        self.high = true;
        Ok(())
    }
}

impl StatefulOutputPin for GpioOutput {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high)
    }
}

/// Host stand-in for input levels: bit `n` set means GPIO `n` reads low.
#[cfg(not(target_os = "espidf"))]
static SIM_INPUT_LOW: AtomicU64 = AtomicU64::new(0);

/// Force a simulated input pin low (pressed) or back to its pulled-up level.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_input_low(pin: u8, low: bool) {
    let mask = 1u64 << pin;
    if low {
        SIM_INPUT_LOW.fetch_or(mask, Ordering::Relaxed);
    } else {
        SIM_INPUT_LOW.fetch_and(!mask, Ordering::Relaxed);
    }
}

#[cfg(target_os = "espidf")]
pub fn configure_input_pullup(pin: u8) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: gpio_config only touches the pin named in the mask.
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn configure_input_pullup(_pin: u8) -> Result<(), HwInitError> {
    Ok(())
}

/// Digital input with the internal pull-up enabled, claimed at runtime.
#[derive(Debug)]
pub struct GpioInput {
    pin: u8,
}

impl GpioInput {
    pub fn new(pin: u8) -> Result<Self, HwInitError> {
        configure_input_pullup(pin)?;
        Ok(Self { pin })
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    #[cfg(target_os = "espidf")]
    fn level_high(&self) -> bool {
        gpio_read(self.pin)
    }

    #[cfg(not(target_os = "espidf"))]
    fn level_high(&self) -> bool {
        SIM_INPUT_LOW.load(Ordering::Relaxed) & (1u64 << self.pin) == 0
    }
}

impl digital::ErrorType for GpioInput {
    type Error = Infallible;
}

impl InputPin for GpioInput {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level_high())
    }
}

// ── LEDC PWM ─────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_ledc_timer() -> Result<(), HwInitError> {
    // Timer 0: pump MOSFET, 8-bit
    let timer0 = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_8_BIT,
        freq_hz: pins::PUMP_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    // SAFETY: Called from single main-task context via init_peripherals().
    let ret = unsafe { ledc_timer_config(&timer0) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed(ret));
    }
    info!("hw_init: LEDC timer 0 at {} Hz", pins::PUMP_PWM_FREQ_HZ);
    Ok(())
}

#[cfg(target_os = "espidf")]
fn ledc_attach(channel: u32, pin: u8) -> Result<(), HwInitError> {
    // SAFETY: the timer was configured in init_ledc_timer(); channel
    // bounds were checked by the caller.
    let ret = unsafe {
        ledc_channel_config(&ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel,
            timer_sel: ledc_timer_t_LEDC_TIMER_0,
            gpio_num: i32::from(pin),
            duty: 0,
            hpoint: 0,
            ..Default::default()
        })
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed(ret));
    }
    info!("hw_init: LEDC CH{channel} on GPIO {pin}");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn ledc_attach(_channel: u32, _pin: u8) -> Result<(), HwInitError> {
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u8) {
    // SAFETY: LEDC channels were configured in ledc_attach(); duty register
    // writes are race-free since only the main loop calls this function.
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, u32::from(duty));
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(_channel: u32, _duty: u8) {}

/// One LEDC channel bound to a pin, exposed as an 8-bit PWM output.
#[derive(Debug)]
pub struct LedcOutput {
    channel: u32,
    pin: u8,
    duty: u8,
}

impl LedcOutput {
    /// Attach `pin` to LEDC `channel` with zero duty.
    pub fn new(channel: u32, pin: u8) -> Result<Self, HwInitError> {
        if channel >= LEDC_CHANNEL_COUNT {
            return Err(HwInitError::LedcChannelsExhausted);
        }
        ledc_attach(channel, pin)?;
        Ok(Self { channel, pin, duty: 0 })
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// Last duty written (0–255).
    pub fn duty(&self) -> u8 {
        self.duty
    }
}

impl pwm::ErrorType for LedcOutput {
    type Error = Infallible;
}

impl SetDutyCycle for LedcOutput {
    fn max_duty_cycle(&self) -> u16 {
        LEDC_MAX_DUTY
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let duty = duty.min(LEDC_MAX_DUTY) as u8;
        ledc_set(self.channel, duty);
        self.duty = duty;
        Ok(())
    }
}
