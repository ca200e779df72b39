//! Calibration admin commands: inspect and edit the stored record.

use std::path::Path;

use eyre::WrapErr;
use serde_json::json;
use weighid_config::{Config, ObjectRow};
use weighid_core::{DetectorBuilder, DetectorCfg, ObjectDetector, SLOTS};
use weighid_hardware::FileEeprom;

/// Open the configured store and restore whatever calibration it holds.
pub fn open_detector(cfg: &Config) -> eyre::Result<ObjectDetector<FileEeprom>> {
    let store = FileEeprom::open(&cfg.store.path, cfg.store.capacity)
        .wrap_err_with(|| format!("opening store {}", cfg.store.path.display()))?;
    DetectorBuilder::new()
        .with_store(store)
        .with_address(cfg.store.address)
        .with_config(DetectorCfg::from(&cfg.detector))
        .load_on_build(true)
        .build()
}

fn record_json(det: &ObjectDetector<FileEeprom>) -> serde_json::Value {
    let objects: Vec<_> = (0..SLOTS)
        .filter_map(|slot| {
            det.object(slot)
                .map(|(weight, tolerance)| json!({ "slot": slot, "weight": weight, "tolerance": tolerance }))
        })
        .collect();
    json!({
        "calibrated": det.is_calibrated(),
        "address": det.address(),
        "offset": det.get_offset(),
        "objects": objects,
    })
}

fn print_record(det: &ObjectDetector<FileEeprom>) {
    let status = if det.is_calibrated() {
        "calibrated"
    } else {
        "not calibrated"
    };
    println!("record @ {}: {status}", det.address());
    println!("slot  weight      tolerance");
    for slot in 0..SLOTS {
        if let Some((w, t)) = det.object(slot) {
            println!("{slot:<5} {w:<11.3} {t:.3}");
        }
    }
    println!("offset {:.3}", det.get_offset());
}

pub fn show(cfg: &Config, json: bool) -> eyre::Result<()> {
    let det = open_detector(cfg)?;
    if json {
        println!("{}", record_json(&det));
    } else {
        print_record(&det);
    }
    Ok(())
}

fn save(det: &mut ObjectDetector<FileEeprom>, json: bool, what: &str) -> eyre::Result<()> {
    det.save_config().wrap_err("saving calibration")?;
    tracing::info!(what, "calibration updated");
    if json {
        let mut out = record_json(det);
        out["saved"] = json!(what);
        println!("{out}");
    } else {
        println!("saved: {what}");
        print_record(det);
    }
    Ok(())
}

pub fn set_object(
    cfg: &Config,
    slot: usize,
    weight: f32,
    tolerance: f32,
    json: bool,
) -> eyre::Result<()> {
    let row = ObjectRow {
        slot,
        weight,
        tolerance,
    };
    weighid_config::validate_objects(&[row]).wrap_err("invalid object")?;

    let mut det = open_detector(cfg)?;
    det.set_object(slot, weight, tolerance);
    save(&mut det, json, &format!("slot {slot}"))
}

pub fn set_offset(cfg: &Config, offset: f32, json: bool) -> eyre::Result<()> {
    if !offset.is_finite() {
        eyre::bail!("offset must be finite");
    }
    let mut det = open_detector(cfg)?;
    det.set_offset(offset);
    save(&mut det, json, "offset")
}

/// Apply rows from `csv` when given, else the config's `[[objects]]` and `offset`.
pub fn import(cfg: &Config, csv: Option<&Path>, json: bool) -> eyre::Result<()> {
    let (rows, offset) = match csv {
        Some(path) => (weighid_config::load_objects_csv(path)?, None),
        None => (cfg.objects.clone(), cfg.offset),
    };
    if rows.is_empty() && offset.is_none() {
        eyre::bail!("nothing to import: config has no [[objects]] or offset");
    }

    let mut det = open_detector(cfg)?;
    det.apply_objects(&rows);
    if let Some(offset) = offset {
        det.set_offset(offset);
    }
    save(&mut det, json, &format!("{} object(s)", rows.len()))
}

pub fn health(cfg: &Config, json: bool) -> eyre::Result<()> {
    let det = open_detector(cfg)?;
    let calibrated = det.is_calibrated();
    if json {
        println!(
            "{}",
            json!({
                "status": "ok",
                "store": cfg.store.path.display().to_string(),
                "address": cfg.store.address,
                "calibrated": calibrated,
            })
        );
    } else {
        println!("status: ok");
        println!("store: {} @ {}", cfg.store.path.display(), cfg.store.address);
        println!("calibrated: {}", if calibrated { "yes" } else { "no" });
    }
    Ok(())
}
