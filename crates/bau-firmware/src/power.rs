//! Display power-up through the AXP2101 PMIC
//!
//! On the CoreS3 the LCD logic and backlight rails hang off the PMIC, so the
//! panel stays dark until these LDOs are enabled.

use axp2101_embedded::AsyncAxp2101;
use esp_hal::peripherals::{GPIO11, GPIO12, I2C0};
use esp_hal::{i2c::master::Config as I2cConfig, time::Rate};
use log::{error, info};

pub type PmicBus = esp_hal::i2c::master::I2c<'static, esp_hal::Async>;

/// Initialize the I2C bus the PMIC sits on
pub fn create_i2c_bus(
    i2c0: I2C0<'static>,
    sda: GPIO12<'static>,
    scl: GPIO11<'static>,
) -> Option<PmicBus> {
    match esp_hal::i2c::master::I2c::new(
        i2c0,
        I2cConfig::default().with_frequency(Rate::from_khz(400)),
    ) {
        Ok(i2c) => Some(i2c.with_sda(sda).with_scl(scl).into_async()),
        Err(e) => {
            error!("I2C bus config rejected: {:?}", e);
            None
        }
    }
}

/// Enable the rails the display needs.
///
/// Returns whether every step succeeded; a `false` result makes the panel
/// report itself as not ready.
pub async fn power_up_display(i2c: PmicBus) -> bool {
    info!("Configuring power management");
    let mut pmic = AsyncAxp2101::new(i2c);

    if let Err(e) = pmic.init().await {
        error!("Power init failed: {:?}", e);
        return false;
    }

    let steps = [
        pmic.enable_aldo1().await,
        pmic.enable_aldo2().await,
        pmic.enable_aldo3().await,
        pmic.enable_aldo4().await,
        pmic.enable_bldo1().await,
        pmic.enable_bldo2().await,
        // Backlight
        pmic.enable_dldo1().await,
        // LCD logic supply
        pmic.set_aldo4_voltage(3300).await,
    ];

    match steps.iter().position(Result::is_err) {
        None => {
            info!("Display rails up");
            true
        }
        Some(step) => {
            error!("Display power step {} failed", step);
            false
        }
    }
}
