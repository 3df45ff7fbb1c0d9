//! Fixed inline JS injected before navigation to capture tracking calls as
//! they actually fire, rather than relying on static markup inspection
//! alone (spec.md §4.2). Mirrors the donor's `page.evaluate()` injection
//! pattern in `browser_setup.rs`, but the payload here wraps `gtag`/`fbq`/
//! `dataLayer.push` instead of spoofing `navigator` properties.

/// Evaluated once, immediately after the blank page is created and before
/// navigation starts, so the wrappers are in place before any of the site's
/// own scripts run.
pub const TRACKING_HOOK_JS: &str = r#"
(() => {
    window.__scan_fired_events__ = [];

    const record = (platform, args) => {
        try {
            window.__scan_fired_events__.push({
                platform,
                args: JSON.parse(JSON.stringify(args)),
                at: Date.now(),
            });
        } catch (e) {
            window.__scan_fired_events__.push({ platform, args: [], at: Date.now() });
        }
    };

    const wrapGtag = () => {
        const original = window.gtag;
        window.gtag = function (...args) {
            record('ga4', args);
            if (typeof original === 'function') return original.apply(this, args);
        };
    };
    const wrapFbq = () => {
        const original = window.fbq;
        window.fbq = function (...args) {
            record('facebook_pixel', args);
            if (typeof original === 'function') return original.apply(this, args);
        };
    };
    const wrapDataLayer = () => {
        window.dataLayer = window.dataLayer || [];
        const original = window.dataLayer.push.bind(window.dataLayer);
        window.dataLayer.push = function (...args) {
            record('gtm', args);
            return original(...args);
        };
    };

    wrapGtag();
    wrapFbq();
    wrapDataLayer();

    // Re-wrap on a short interval: some sites assign gtag/fbq after our
    // initial wrap runs, which would silently drop the hook.
    window.__scan_hook_interval__ = setInterval(() => {
        if (typeof window.gtag === 'function' && !window.gtag.__scanWrapped) {
            wrapGtag();
            window.gtag.__scanWrapped = true;
        }
        if (typeof window.fbq === 'function' && !window.fbq.__scanWrapped) {
            wrapFbq();
            window.fbq.__scanWrapped = true;
        }
    }, 250);
})();
"#;

/// Evaluated after the page has settled, to read back whatever fired.
pub const READ_FIRED_EVENTS_JS: &str = "window.__scan_fired_events__ || []";

/// Stops the re-wrap interval so it doesn't keep the page's event loop busy
/// while we extract results.
pub const STOP_HOOK_JS: &str = "clearInterval(window.__scan_hook_interval__)";
