#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::timer::timg::TimerGroup;
use log::{error, info};
use static_cell::StaticCell;

// Display-LCD panel specific imports
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::spi::master::{Config, Spi};
use mipidsi::interface::SpiInterface;
use mipidsi::{Builder as MipidsiBuilder, models::ILI9342CRgb565};

use bau_core::QrRenderer;
use bau_core::config::RendererConfig;
use bau_core::display::Panel;
use bau_core::display_manager::{
    DisplayManager, DisplayRequest, get_display_receiver, get_display_sender,
};
use bau_core::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX};
use bau_firmware::panel::DevicePanel;
use bau_firmware::{power, source};

/// SPI batching buffer for the display interface (larger = faster, uses more RAM)
const SPI_BUFFER_LEN: usize = 512;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

/// Park the main task forever after an unrecoverable startup failure.
async fn halt() -> ! {
    loop {
        Timer::after(Duration::from_secs(60)).await;
    }
}

/// Publish the advertised identity to the display task.
#[embassy_executor::task]
async fn broadcast_source() {
    match source::configured_identity() {
        Ok(identity) => {
            info!(
                "Advertising {} as {} / {:06X}",
                core::str::from_utf8(identity.name()).unwrap_or("<binary name>"),
                identity.address,
                identity.broadcast_id.get()
            );
            get_display_sender()
                .send(DisplayRequest::UpdateIdentity(identity))
                .await;
        }
        Err(e) => error!("Invalid build-time broadcast identity: {}", e),
    }
}

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!(log::LevelFilter::Info);

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);
    // The full-screen framebuffer lives in PSRAM
    esp_alloc::psram_allocator!(peripherals.PSRAM, esp_hal::psram);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized!");

    // Power the panel before talking to it
    let powered = match power::create_i2c_bus(
        peripherals.I2C0,
        peripherals.GPIO12,
        peripherals.GPIO11,
    ) {
        Some(i2c) => power::power_up_display(i2c).await,
        None => false,
    };

    // 1. Configure SPI bus
    let spi_bus = match Spi::new(peripherals.SPI2, Config::default()) {
        Ok(spi) => spi
            .with_sck(peripherals.GPIO36)
            .with_mosi(peripherals.GPIO37),
        Err(e) => {
            error!("SPI config rejected: {:?}", e);
            halt().await
        }
    };

    // 2. Create a dummy CS pin (we don't use hardware CS for this display)
    let cs = Output::new(peripherals.GPIO35, Level::High, OutputConfig::default());

    // 3. Wrap the SPI bus as a SPI device (required by embedded-hal traits)
    let spi_device = match ExclusiveDevice::new_no_delay(spi_bus, cs) {
        Ok(device) => device,
        Err(e) => {
            error!("SPI device setup failed: {:?}", e);
            halt().await
        }
    };

    // 4. Set up DC (Data/Command) pin
    let dc = Output::new(peripherals.GPIO34, Level::Low, OutputConfig::default());

    // 5. Create a buffer for SPI batching
    static SPI_BUFFER: StaticCell<[u8; SPI_BUFFER_LEN]> = StaticCell::new();
    let spi_buffer = SPI_BUFFER.init([0u8; SPI_BUFFER_LEN]);

    // 6. Create display interface
    let di = SpiInterface::new(spi_device, dc, spi_buffer);

    // 7. Build and initialize the display driver
    let display = match MipidsiBuilder::new(ILI9342CRgb565, di)
        .display_size(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX)
        .init(&mut embassy_time::Delay)
    {
        Ok(display) => display,
        Err(e) => {
            error!("Failed to initialize display: {:?}", e);
            halt().await
        }
    };

    info!("Display initialized!");

    // mipidsi's init leaves the panel awake showing stale GRAM; keep it dark
    // until the renderer has drawn the first frame
    let mut panel = DevicePanel::new(display, powered);
    if let Err(e) = panel.set_blanking(true) {
        error!("Failed to blank panel: {:?}", e);
    }
    let renderer = match QrRenderer::initialize(&mut panel, &RendererConfig::default()) {
        Ok(renderer) => renderer,
        Err(e) => {
            error!("QR renderer init failed: {:?}", e);
            halt().await
        }
    };

    match broadcast_source() {
        Ok(token) => spawner.spawn(token),
        Err(e) => error!("Failed to spawn broadcast source: {:?}", e),
    }

    let mut manager = DisplayManager::new(panel, renderer);
    manager.run(get_display_receiver()).await;

    halt().await
}
