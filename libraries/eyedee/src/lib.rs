#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
use uuid::Uuid;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["self", "crypto"])]
    fn randomUUID() -> String;

    #[wasm_bindgen(js_namespace = ["self", "crypto"], js_name = getRandomValues)]
    fn get_random_values(buf: &mut [u8]);
}

/// A fresh random (v4) UUID, e.g. for list and word ids.
pub fn get_uuid() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        randomUUID()
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Uuid::new_v4().to_string()
    }
}

/// 64 bits from the platform's secure random source, for seeding a deterministic RNG.
pub fn random_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        let mut bytes = [0u8; 8];
        get_random_values(&mut bytes);
        u64::from_le_bytes(bytes)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Uuid::new_v4().as_u64_pair().0
    }
}
