pub const CHECK_ELEMENT_STATE: &str = r#"
(selector) => {
    const el = document.querySelector(selector);
    if (!el) return { exists: false };

    const rect = el.getBoundingClientRect();
    const style = window.getComputedStyle(el);
    const isVisible = rect.width > 0 && rect.height > 0 &&
                     style.visibility !== 'hidden' && style.display !== 'none';

    return {
        exists: true,
        visible: isVisible,
        disabled: el.disabled || el.getAttribute('aria-disabled') === 'true',
        matchedSelector: selector,
        actualTag: el.tagName
    };
}
"#;

pub const SAFE_CLICK: &str = r#"
(selector) => {
    const el = document.querySelector(selector);
    if (!el) return { success: false, error: 'Element not found' };
    el.click();
    return { success: true };
}
"#;

pub const TYPE_TEXT: &str = r#"
(selector, text, clear) => {
    const el = document.querySelector(selector);
    if (!el) return { success: false, error: 'Element not found' };
    if (clear) el.value = '';
    el.focus();
    el.value = clear ? text : el.value + text;
    el.dispatchEvent(new Event('input', { bubbles: true }));
    el.dispatchEvent(new Event('change', { bubbles: true }));
    return { success: true };
}
"#;
