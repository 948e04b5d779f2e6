//! Panic hook routing Rust panics to the browser console.

/// Route panics to `console.error` instead of an opaque `unreachable`.
pub fn set_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("WebGenius WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
