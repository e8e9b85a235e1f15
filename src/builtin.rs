pub const BUILTIN_CSS: &str = include_str!("builtin.css");

pub const THEME_TOGGLE_JS: &str = r#"(function () {
  var storageKey = "theme";
  var root = document.documentElement;
  var button = document.getElementById("toggle-tema");

  function systemTheme() {
    try {
      return window.matchMedia && window.matchMedia("(prefers-color-scheme: dark)").matches
        ? "dark"
        : "light";
    } catch (_) {
      return "light";
    }
  }

  var saved = null;
  try {
    saved = localStorage.getItem(storageKey);
  } catch (_) {
    saved = null;
  }
  if (saved === "light" || saved === "dark") {
    root.setAttribute("data-theme", saved);
    root.removeAttribute("data-theme-source");
  } else if (
    !root.getAttribute("data-theme") ||
    root.getAttribute("data-theme-source") === "system"
  ) {
    root.setAttribute("data-theme", systemTheme());
  }

  if (button) {
    button.addEventListener("click", function () {
      var current = root.getAttribute("data-theme") || "light";
      var next = current === "light" ? "dark" : "light";
      root.setAttribute("data-theme", next);
      root.removeAttribute("data-theme-source");
      try {
        localStorage.setItem(storageKey, next);
      } catch (_) {}
    });
  }
})();"#;

pub const DEPARTMENT_SEARCH_JS: &str = r#"(function () {
  var form = document.getElementById("form-buscar-depto");
  var input = document.getElementById("busqueda-departamento");
  var grid = document.getElementById("departamentos-grid");
  if (!form || !input || !grid) return;

  var empty = grid.querySelector(".no-results");
  if (!empty) {
    empty = document.createElement("p");
    empty.className = "no-results";
    empty.textContent = "No se encontraron departamentos con ese nombre.";
  }

  function apply() {
    if (grid.querySelector(".section-error")) return;
    var query = input.value.trim().toLowerCase();
    var cards = grid.querySelectorAll(".depto-card");
    var shown = 0;
    for (var i = 0; i < cards.length; i++) {
      var name = (cards[i].getAttribute("data-name") || "").toLowerCase();
      var match = query === "" || name.indexOf(query) !== -1;
      cards[i].hidden = !match;
      if (match) shown++;
    }
    if (shown === 0) {
      grid.appendChild(empty);
    } else if (empty.parentNode) {
      empty.parentNode.removeChild(empty);
    }
  }

  form.addEventListener("submit", function (e) {
    e.preventDefault();
    apply();
  });
  input.addEventListener("input", apply);
})();"#;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_script_lets_viewer_scheme_replace_system_default() {
        assert!(THEME_TOGGLE_JS.contains(r#"getAttribute("data-theme-source") === "system""#));
        assert!(THEME_TOGGLE_JS.contains(r#"removeAttribute("data-theme-source")"#));
    }

    #[test]
    fn search_script_reuses_rendered_no_results_message() {
        assert!(DEPARTMENT_SEARCH_JS.contains(r#"var empty = grid.querySelector(".no-results");"#));
        assert!(DEPARTMENT_SEARCH_JS.contains("if (shown === 0) {"));
        assert!(!DEPARTMENT_SEARCH_JS.contains("cards.length > 0"));
    }
}
