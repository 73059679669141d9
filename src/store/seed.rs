//! Demo catalog seeding.
//!
//! Local development and the test suites expect a small known catalog to
//! page through. Seeding only touches an empty store, so a restart against
//! an existing database never duplicates or resets items.

use rust_decimal::Decimal;
use tracing::info;

use super::{ItemDraft, ItemStore, Result};

struct SeedItem {
    name: &'static str,
    description: &'static str,
    /// Price in cents.
    price_cents: i64,
    stock: i64,
    img: &'static str,
    img_alt: Option<&'static str>,
}

const DEMO_CATALOG: [SeedItem; 12] = [
    SeedItem {
        name: "Mechanical Keyboard",
        description: "Tenkeyless mechanical keyboard with brown switches",
        price_cents: 8950,
        stock: 40,
        img: "kb-tkl.jpg",
        img_alt: Some("Tenkeyless mechanical keyboard"),
    },
    SeedItem {
        name: "Wireless Mouse",
        description: "Low-latency wireless mouse, USB receiver included",
        price_cents: 2475,
        stock: 120,
        img: "mouse-wl.jpg",
        img_alt: Some("Wireless optical mouse"),
    },
    SeedItem {
        name: "27in 4K Monitor",
        description: "27 inch IPS monitor, 3840x2160, height adjustable",
        price_cents: 38900,
        stock: 18,
        img: "mon-27-4k.jpg",
        img_alt: Some("27 inch monitor on stand"),
    },
    SeedItem {
        name: "USB-C Dock",
        description: "11-in-1 USB-C docking station with dual HDMI",
        price_cents: 14925,
        stock: 35,
        img: "dock-usbc.jpg",
        img_alt: None,
    },
    SeedItem {
        name: "Laptop Stand",
        description: "Aluminium laptop stand, adjustable tilt",
        price_cents: 4200,
        stock: 60,
        img: "stand-alu.jpg",
        img_alt: Some("Aluminium laptop stand"),
    },
    SeedItem {
        name: "Noise-Cancelling Headphones",
        description: "Over-ear wireless headphones with active noise cancelling",
        price_cents: 27950,
        stock: 25,
        img: "hp-anc.jpg",
        img_alt: Some("Over-ear headphones"),
    },
    SeedItem {
        name: "1080p Webcam",
        description: "Full HD webcam with privacy shutter and dual microphones",
        price_cents: 5975,
        stock: 80,
        img: "cam-1080.jpg",
        img_alt: None,
    },
    SeedItem {
        name: "USB Microphone",
        description: "Cardioid condenser USB microphone with desk stand",
        price_cents: 9900,
        stock: 45,
        img: "mic-usb.jpg",
        img_alt: Some("USB condenser microphone"),
    },
    SeedItem {
        name: "Portable SSD 1TB",
        description: "1TB external solid state drive, USB 3.2",
        price_cents: 11950,
        stock: 95,
        img: "ssd-1tb.jpg",
        img_alt: Some("Portable solid state drive"),
    },
    SeedItem {
        name: "Ergonomic Chair",
        description: "Mesh-back office chair with lumbar support",
        price_cents: 44900,
        stock: 12,
        img: "chair-ergo.jpg",
        img_alt: Some("Ergonomic office chair"),
    },
    SeedItem {
        name: "Desk Mat",
        description: "900x400mm felt desk mat",
        price_cents: 1925,
        stock: 150,
        img: "mat-felt.jpg",
        img_alt: None,
    },
    SeedItem {
        name: "HDMI Cable 2m",
        description: "HDMI 2.1 cable, 2 metres, braided",
        price_cents: 975,
        stock: 300,
        img: "cable-hdmi-2m.jpg",
        img_alt: Some("Braided HDMI cable"),
    },
];

/// Seed the demo catalog into an empty store.
///
/// Returns the number of items inserted: the full catalog on a fresh store,
/// zero when the store already holds items.
pub async fn seed_demo_items(store: &dyn ItemStore) -> Result<u64> {
    let existing = store.count().await?;
    if existing > 0 {
        info!(items = existing, "Item store already populated, skipping seed");
        return Ok(0);
    }

    for seed in DEMO_CATALOG.iter() {
        store
            .create(&ItemDraft {
                stock: seed.stock,
                name: seed.name.to_string(),
                description: seed.description.to_string(),
                price: Decimal::new(seed.price_cents, 2),
                img_alt: seed.img_alt.map(str::to_string),
                img: seed.img.to_string(),
            })
            .await?;
    }

    info!(items = DEMO_CATALOG.len(), "Seeded demo catalog");
    Ok(DEMO_CATALOG.len() as u64)
}
