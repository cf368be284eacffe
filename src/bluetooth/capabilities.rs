/// Bluetooth Class of Device to WiGLE capability string encoding
use std::collections::HashMap;

/// Major + minor device class bits (2-12) of a Class of Device value
pub const DEVICE_CLASS_MASK: u32 = 0x1FFC;

/// Suffix appended to every capability string for BLE scan results
const LE_SUFFIX: &str = " [LE]";

/// Capability name used for any class code missing from the legend
const FALLBACK_NAME: &str = "Misc";

/// WiGLE device-type legend, keyed by masked major+minor class.
///
/// Mirrors the WiGLE Android app's DEVICE_TYPE_LEGEND. The Imaging major class
/// (0x0600) has no entry there and falls through to "Misc".
pub const DEVICE_TYPE_LEGEND: &[(u32, &str)] = &[
    // Misc
    (0x0000, "Misc"),
    // Computer
    (0x0100, "Computer"),
    (0x0104, "Desktop"),
    (0x0108, "Server"),
    (0x010C, "Laptop"),
    (0x0110, "PDA"),
    (0x0114, "Palm"),
    (0x0118, "Wearable Computer"),
    // Phone
    (0x0200, "Phone"),
    (0x0204, "Cellphone"),
    (0x0208, "Cordless Phone"),
    (0x020C, "Smartphone"),
    (0x0210, "Modem/GW"),
    (0x0214, "ISDN"),
    // Audio/Video
    (0x0400, "A/V"),
    (0x0404, "Headset"),
    (0x0408, "Handsfree"),
    (0x0410, "Mic"),
    (0x0414, "Speaker"),
    (0x0418, "Headphones"),
    (0x041C, "Portable Audio"),
    (0x0420, "Car Audio"),
    (0x0428, "HiFi"),
    (0x0430, "Monitor"),
    (0x0434, "Settop"),
    (0x0438, "Camera"),
    (0x043C, "VCR"),
    (0x0440, "Videoconf"),
    (0x0448, "AV Toy"),
    (0x044C, "Display/Speaker"),
    // Not a multiple of 4, so no masked code ever lands here
    (0x0456, "Camcorder"),
    // Peripheral
    (0x0500, "Keyboard !p"),
    (0x0540, "Keyboard"),
    (0x0580, "Pointer"),
    (0x05C0, "Keyboard+p"),
    // Wearable
    (0x0700, "Wearable"),
    (0x0704, "Watch"),
    (0x0708, "Jacket"),
    (0x070C, "Pager"),
    (0x0710, "Helmet"),
    (0x0714, "Glasses"),
    // Toy
    (0x0800, "Toy"),
    (0x0804, "Robot"),
    (0x0808, "Vehicle"),
    (0x080C, "Doll"),
    (0x0814, "Game"),
    (0x0820, "Controller"),
    // Health
    (0x0900, "Health"),
    (0x0904, "Blood Pressure"),
    (0x0908, "Thermometer"),
    (0x090C, "Scale"),
    (0x0910, "Glucose"),
    (0x0914, "PulseOxy"),
    (0x0918, "Pulse"),
    (0x091C, "Health Display"),
    // Uncategorized
    (0x1F00, "Uncategorized"),
];

/// Strip a raw Class of Device value down to its major + minor bits
pub fn masked_class(class: u32) -> u32 {
    class & DEVICE_CLASS_MASK
}

/// Turns class codes into WiGLE capability strings such as `"Smartphone [LE]"`.
///
/// The lookup table is plain data so alternative legends can be swapped in.
#[derive(Debug, Clone)]
pub struct CapabilityEncoder {
    legend: HashMap<u32, &'static str>,
}

impl Default for CapabilityEncoder {
    fn default() -> Self {
        Self::with_legend(DEVICE_TYPE_LEGEND)
    }
}

impl CapabilityEncoder {
    pub fn with_legend(entries: &[(u32, &'static str)]) -> Self {
        Self {
            legend: entries.iter().copied().collect(),
        }
    }

    /// Encode a raw class code. Total over all `u32` inputs.
    pub fn encode(&self, class: u32) -> String {
        let name = self
            .legend
            .get(&masked_class(class))
            .copied()
            .unwrap_or(FALLBACK_NAME);
        format!("{}{}", name, LE_SUFFIX)
    }
}
