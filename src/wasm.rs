//! WASM bindings for VoltLab Core.
//!
//! The browser owns the canvas and the editing UI; this module owns the
//! topology and the solve. The page calls `tick()` from its animation loop
//! and redraws meters from the returned readings.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmLab } from 'voltlab_core';
//!
//! await init();
//!
//! const lab = new WasmLab(snapshotJson);
//! lab.start();
//!
//! function frame() {
//!   const readings = JSON.parse(lab.tick());
//!   for (const r of readings.readings) drawMeter(r.item, r.display);
//!   requestAnimationFrame(frame);
//! }
//! requestAnimationFrame(frame);
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::{ItemId, Topology};
use crate::error::LabError;
use crate::solver::Lab;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(e: LabError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// WASM-compatible circuit bench.
///
/// Wraps the native [`Lab`] and exchanges topology and readings as JSON.
#[wasm_bindgen]
pub struct WasmLab {
    lab: Lab,
}

#[wasm_bindgen]
impl WasmLab {
    /// Create a stopped bench from a topology snapshot.
    ///
    /// # Arguments
    /// * `snapshot_json` - `{ items, nodes, wires }` as produced by `snapshot()`
    #[wasm_bindgen(constructor)]
    pub fn new(snapshot_json: &str) -> Result<WasmLab, JsValue> {
        let topology = Topology::from_json(snapshot_json).map_err(to_js)?;
        Ok(WasmLab {
            lab: Lab::new(topology),
        })
    }

    /// Replace the whole topology, e.g. after an undo in the editor.
    #[wasm_bindgen]
    pub fn load(&mut self, snapshot_json: &str) -> Result<(), JsValue> {
        *self.lab.topology_mut() = Topology::from_json(snapshot_json).map_err(to_js)?;
        Ok(())
    }

    /// Current topology, including meter displays and bulb brightness.
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<String, JsValue> {
        self.lab.topology().to_json().map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn start(&mut self) {
        self.lab.start();
    }

    #[wasm_bindgen]
    pub fn stop(&mut self) {
        self.lab.stop();
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.lab.is_running()
    }

    /// Solve once and return the readings as JSON.
    ///
    /// Returns `"null"` while stopped.
    #[wasm_bindgen]
    pub fn tick(&mut self) -> Result<String, JsValue> {
        match self.lab.tick() {
            Some(readings) => readings.to_json().map_err(to_js),
            None => Ok("null".to_string()),
        }
    }

    /// Open or close a switch.
    #[wasm_bindgen]
    pub fn set_switch(&mut self, item: u32, closed: bool) -> Result<(), JsValue> {
        self.lab
            .topology_mut()
            .set_switch(ItemId(item), closed)
            .map_err(to_js)
    }

    /// Flip a switch and return its new state.
    #[wasm_bindgen]
    pub fn toggle_switch(&mut self, item: u32) -> Result<bool, JsValue> {
        self.lab
            .topology_mut()
            .toggle_switch(ItemId(item))
            .map_err(to_js)
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
