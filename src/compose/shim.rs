//! Diagnostic shim injected ahead of the user's script.
//!
//! Wraps `console.log/info/warn/error` so every call still reaches the
//! original console and is also posted to the parent frame as one relay
//! message `{type:"console", level, args, sequence}`. Serialization never
//! throws: values that cannot be stringified become a placeholder.

/// Placeholder emitted for arguments the shim cannot serialize.
pub const UNSERIALIZABLE: &str = "[unserializable]";

/// Relay message `type` tag used by the shim.
pub const RELAY_TYPE: &str = "console";

pub(super) const SHIM_SCRIPT: &str = r#"(function () {
  var sequence = 0;
  var placeholder = "[unserializable]";
  function describe(value) {
    if (value === null || typeof value !== "object") {
      return String(value);
    }
    if (value instanceof Error) {
      return value.name + ": " + value.message;
    }
    try {
      var text = JSON.stringify(value);
      return text === undefined ? String(value) : text;
    } catch (e) {
      return placeholder;
    }
  }
  function relay(level, args) {
    var parts = [];
    for (var i = 0; i < args.length; i++) {
      try {
        parts.push(describe(args[i]));
      } catch (e) {
        parts.push(placeholder);
      }
    }
    sequence += 1;
    try {
      window.parent.postMessage(
        { type: "console", level: level, args: parts.join(" "), sequence: sequence },
        "*"
      );
    } catch (e) {}
  }
  ["log", "info", "warn", "error"].forEach(function (level) {
    var original = console[level];
    console[level] = function () {
      try {
        if (original) {
          original.apply(console, arguments);
        }
      } catch (e) {}
      relay(level, arguments);
    };
  });
  window.addEventListener("error", function (event) {
    relay("error", [event.message || "Script error"]);
  });
  window.addEventListener("unhandledrejection", function (event) {
    relay("error", ["Unhandled rejection: " + describe(event.reason)]);
  });
})();"#;
