//! Starter projects.

use crate::source::SourceSet;

/// A named starter project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub name: &'static str,
    pub description: &'static str,
    pub markup: &'static str,
    pub styles: &'static str,
    pub script: &'static str,
}

impl Template {
    pub fn sources(&self) -> SourceSet {
        SourceSet::new(self.markup, self.styles, self.script)
    }

    /// Lowercase, dash-separated name used on the command line.
    pub fn slug(&self) -> String {
        self.name.to_ascii_lowercase().replace(' ', "-")
    }
}

/// Buffers a fresh project starts with, and what reset restores.
pub fn default_sources() -> SourceSet {
    SourceSet::new(
        "<!-- Add your HTML here -->\n<h1>Hello HTMLReader!</h1>\n<p>Start coding to see the live preview.</p>",
        "/* Add your CSS here */\nbody {\n  font-family: system-ui, sans-serif;\n  line-height: 1.5;\n  padding: 2rem;\n}\n\nh1 {\n  color: #C05746;\n}",
        "// Add your JavaScript here\nconsole.log(\"HTMLReader is running!\");",
    )
}

pub const TEMPLATES: &[Template] = &[
    Template {
        name: "Basic",
        description: "A simple HTML5 template",
        markup: "<h1>Hello World</h1>\n<p>This is a basic HTML template.</p>",
        styles: "body {\n  font-family: system-ui, -apple-system, sans-serif;\n  line-height: 1.5;\n  padding: 2rem;\n  max-width: 800px;\n  margin: 0 auto;\n}\n\nh1 {\n  color: #C05746;\n}",
        script: "// Your JavaScript code here\nconsole.log(\"Hello from HTMLReader!\");",
    },
    Template {
        name: "Navbar",
        description: "Responsive navigation bar",
        markup: r##"<header>
  <nav class="navbar">
    <div class="logo">Brand</div>
    <button class="menu-toggle" aria-label="Toggle Menu">&#9776;</button>
    <ul class="nav-links">
      <li><a href="#" class="active">Home</a></li>
      <li><a href="#">About</a></li>
      <li><a href="#">Services</a></li>
      <li><a href="#">Contact</a></li>
    </ul>
  </nav>
</header>
<main>
  <h1>Responsive Navbar</h1>
  <p>Resize the preview to see the menu collapse.</p>
</main>"##,
        styles: r".navbar {
  display: flex;
  align-items: center;
  justify-content: space-between;
  padding: 1rem 2rem;
  background: #2d3047;
  color: #fff;
}

.nav-links {
  display: flex;
  gap: 1.5rem;
  list-style: none;
}

.nav-links a {
  color: #fff;
  text-decoration: none;
}

.nav-links a.active {
  border-bottom: 2px solid #C05746;
}

.menu-toggle {
  display: none;
  background: none;
  border: none;
  color: #fff;
  font-size: 1.5rem;
}

main {
  padding: 2rem;
}

@media (max-width: 600px) {
  .menu-toggle {
    display: block;
  }

  .nav-links {
    display: none;
    flex-direction: column;
    width: 100%;
  }

  .nav-links.open {
    display: flex;
  }

  .navbar {
    flex-wrap: wrap;
  }
}",
        script: r#"const toggle = document.querySelector(".menu-toggle");
const links = document.querySelector(".nav-links");

toggle.addEventListener("click", () => {
  links.classList.toggle("open");
  console.log("menu open:", links.classList.contains("open"));
});"#,
    },
    Template {
        name: "Contact Form",
        description: "Styled contact form with validation",
        markup: r#"<form id="contact" novalidate>
  <h2>Contact Us</h2>
  <label for="name">Name</label>
  <input id="name" name="name" required>
  <label for="email">Email</label>
  <input id="email" name="email" type="email" required>
  <label for="message">Message</label>
  <textarea id="message" name="message" rows="4" required></textarea>
  <p class="error" id="error"></p>
  <button type="submit">Send</button>
</form>"#,
        styles: r"body {
  display: flex;
  justify-content: center;
  padding: 2rem;
  background: #f4f4f8;
}

form {
  display: flex;
  flex-direction: column;
  gap: 0.5rem;
  width: 100%;
  max-width: 420px;
  padding: 2rem;
  background: #fff;
  border-radius: 8px;
  box-shadow: 0 2px 8px rgba(0, 0, 0, 0.1);
}

input,
textarea {
  padding: 0.5rem;
  border: 1px solid #ccc;
  border-radius: 4px;
}

.error {
  color: #C05746;
  min-height: 1.5em;
}

button {
  padding: 0.75rem;
  border: none;
  border-radius: 4px;
  background: #2d3047;
  color: #fff;
  cursor: pointer;
}",
        script: r#"const form = document.getElementById("contact");
const error = document.getElementById("error");

form.addEventListener("submit", (event) => {
  event.preventDefault();
  const data = {
    name: form.name.value.trim(),
    email: form.email.value.trim(),
    message: form.message.value.trim(),
  };
  if (!data.name || !data.email || !data.message) {
    error.textContent = "Please fill in every field.";
    console.warn("validation failed", data);
    return;
  }
  if (!/^[^@\s]+@[^@\s]+$/.test(data.email)) {
    error.textContent = "Please enter a valid email address.";
    return;
  }
  error.textContent = "";
  console.log("submitted", data);
  form.reset();
});"#,
    },
    Template {
        name: "Card Grid",
        description: "Responsive card layout with flexbox",
        markup: r#"<h1>Our Services</h1>
<div class="grid">
  <article class="card"><h3>Design</h3><p>Layouts that work on every screen.</p></article>
  <article class="card"><h3>Develop</h3><p>Fast, accessible front ends.</p></article>
  <article class="card"><h3>Deploy</h3><p>Ship with confidence.</p></article>
  <article class="card"><h3>Support</h3><p>We stick around after launch.</p></article>
</div>"#,
        styles: r"body {
  padding: 2rem;
  background: #fafafa;
}

h1 {
  margin-bottom: 1.5rem;
  text-align: center;
}

.grid {
  display: flex;
  flex-wrap: wrap;
  gap: 1rem;
}

.card {
  flex: 1 1 200px;
  padding: 1.5rem;
  background: #fff;
  border-radius: 8px;
  box-shadow: 0 1px 4px rgba(0, 0, 0, 0.12);
  transition: transform 0.2s;
}

.card:hover {
  transform: translateY(-4px);
}",
        script: r#"document.querySelectorAll(".card").forEach((card) => {
  card.addEventListener("click", () => {
    console.log("selected", card.querySelector("h3").textContent);
  });
});"#,
    },
];

/// Find a template by display name or slug, ignoring case.
pub fn find(name: &str) -> Option<&'static Template> {
    let wanted = name.trim().to_ascii_lowercase();
    TEMPLATES
        .iter()
        .find(|t| t.name.to_ascii_lowercase() == wanted || t.slug() == wanted)
}
