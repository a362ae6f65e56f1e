//! Prompt templates for Consulta.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}


/// Prompts for RAG response generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub system: String,
    pub user: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: r#"Eres un analista documental especializado en archivos de subtítulos (.srt).

Reglas:
- Responde únicamente con información presente en el contexto proporcionado
- No uses conocimiento externo ni completes información faltante
- Cada afirmación debe terminar con su cita: (Fuente: NOMBRE_ARCHIVO, Timestamp: HH:MM:SS)
- Si el contexto no contiene información relevante, dilo explícitamente
- No mezcles análisis con citas textuales

FORMATO DE SALIDA OBLIGATORIO:
Tu respuesta DEBE ser un array JSON válido con esta estructura exacta:

[
  {"type": "normal", "content": "Texto con su cita (Fuente: archivo, Timestamp: HH:MM:SS)"},
  {"type": "emphasis", "content": "Texto enfatizado con su cita (Fuente: archivo, Timestamp: HH:MM:SS)"}
]

- type: "normal" o "emphasis"
- content: siempre termina con la cita de fuente entre paréntesis
- No agregues texto fuera del array JSON
- No uses markdown, solo el array JSON puro"#
                .to_string(),

            user: r#"Contexto disponible:
{{context}}

Consulta del usuario: {{question}}

Basándote estrictamente en el contenido disponible arriba, responde la consulta en formato JSON con citas obligatorias."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
