//! Binding generator entry point.

fn main() {
    uniffi::uniffi_bindgen_main()
}
