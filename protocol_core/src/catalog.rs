//! Default exercise catalog and name resolution.
//!
//! The catalog is reference data only. Resolution never fails the caller:
//! an unknown exercise is simply rendered by name.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

fn entry(
    id: &str,
    name: &str,
    category: &str,
    difficulty: Difficulty,
    description: &str,
    tips: [&str; 3],
) -> ExerciseCatalogEntry {
    ExerciseCatalogEntry {
        id: id.into(),
        name: name.into(),
        category: category.into(),
        difficulty,
        description: description.into(),
        video_url: Some(format!(
            "https://www.youtube.com/results?search_query={}+execução+correta",
            name.to_lowercase().replace(' ', "+")
        )),
        animation_url: None,
        tips: tips.iter().map(|t| t.to_string()).collect(),
    }
}

/// Builds the default catalog with the built-in exercises
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference.
pub fn build_default_catalog() -> Catalog {
    use Difficulty::*;

    let entries = vec![
        // Bíceps
        entry(
            "1",
            "Rosca Direta",
            "Bíceps",
            Beginner,
            "O exercício clássico para construção de pico de bíceps com barra ou halteres.",
            [
                "Mantenha os cotovelos colados ao corpo",
                "Não balance as costas",
                "Controle a descida (fase excêntrica)",
            ],
        ),
        entry(
            "b2",
            "Rosca Martelo",
            "Bíceps",
            Beginner,
            "Focado no braquial e braquiorradial, excelente para dar espessura ao braço.",
            [
                "Pegada neutra (palmas para dentro)",
                "Evite usar o impulso dos ombros",
                "Esmague o músculo no topo",
            ],
        ),
        entry(
            "b3",
            "Rosca Concentrada",
            "Bíceps",
            Intermediate,
            "Isolamento total para o pico do bíceps.",
            [
                "Apoie o braço na parte interna da coxa",
                "Movimento lento e controlado",
                "Foco na contração máxima",
            ],
        ),
        // Tríceps
        entry(
            "2",
            "Tríceps Testa",
            "Tríceps",
            Intermediate,
            "Focado na cabeça longa do tríceps, essencial para a espessura do braço.",
            [
                "Cotovelos apontando para o teto",
                "Desça a barra devagar até a testa",
                "Estenda totalmente os braços",
            ],
        ),
        entry(
            "t2",
            "Tríceps Pulley",
            "Tríceps",
            Beginner,
            "Exercício fundamental em polia para isolamento do tríceps.",
            [
                "Mantenha os ombros para baixo",
                "Não abra os cotovelos",
                "Estenda o braço até o final",
            ],
        ),
        entry(
            "t3",
            "Tríceps Corda",
            "Tríceps",
            Intermediate,
            "Permite maior amplitude e contração do tríceps na fase final.",
            [
                "Abra a corda no final do movimento",
                "Mantenha o punho firme",
                "Foco na parte lateral do tríceps",
            ],
        ),
        // Peitoral
        entry(
            "3",
            "Supino Reto",
            "Peitoral",
            Intermediate,
            "Rei dos exercícios de empurrar para peitoral, ombros e tríceps.",
            [
                "Adução de escápulas",
                "Toque levemente o peito",
                "Mantenha os pés firmes no chão",
            ],
        ),
        entry(
            "p2",
            "Peck Deck",
            "Peitoral",
            Beginner,
            "Máquina voador para isolamento e \"pump\" no peitoral.",
            [
                "Mantenha o peito aberto",
                "Não deixe os ombros virem para frente",
                "Sinta o alongamento no final",
            ],
        ),
        // Costas
        entry(
            "c1",
            "Puxada Alta",
            "Costas",
            Beginner,
            "Trabalha a largura das costas (Latíssimo do dorso).",
            [
                "Puxe a barra em direção ao peito",
                "Incline levemente o tronco para trás",
                "Não use o corpo para balançar",
            ],
        ),
        entry(
            "c2",
            "Remada Baixa",
            "Costas",
            Beginner,
            "Focado na espessura das costas e trapézio médio.",
            [
                "Mantenha a coluna ereta",
                "Traga o triângulo até o abdômen",
                "Aperte as escápulas no final",
            ],
        ),
        // Pernas
        entry(
            "4",
            "Agachamento Livre",
            "Pernas",
            Advanced,
            "O melhor exercício para construção de membros inferiores e core.",
            [
                "Peito estufado",
                "Joelhos na direção da ponta dos pés",
                "Desça até quebrar o paralelo",
            ],
        ),
        entry(
            "l2",
            "Cadeira Extensora",
            "Pernas",
            Beginner,
            "Isolamento máximo para o quadríceps.",
            [
                "Mantenha o quadril fixo no banco",
                "Extensão total dos joelhos",
                "Controle a descida",
            ],
        ),
        // Ombros
        entry(
            "o1",
            "Elevação Lateral",
            "Ombros",
            Beginner,
            "O segredo para ombros largos e estéticos.",
            [
                "Leve os halteres até a linha do ombro",
                "Pequena flexão nos cotovelos",
                "Imagine que está derramando água de uma jarra",
            ],
        ),
        entry(
            "o2",
            "Desenvolvimento",
            "Ombros",
            Intermediate,
            "Exercício básico de força para a parte frontal e lateral do deltóide.",
            [
                "Mantenha os antebraços na vertical",
                "Não arqueie excessivamente as costas",
                "Estenda acima da cabeça",
            ],
        ),
    ];

    Catalog { entries }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Catalog {
    /// Catalog with extra entries appended after the existing ones.
    ///
    /// Entries whose id is already present are skipped with a warning.
    pub fn with_custom(&self, custom: &[ExerciseCatalogEntry]) -> Catalog {
        let mut entries = self.entries.clone();
        for extra in custom {
            if entries.iter().any(|e| e.id == extra.id) {
                tracing::warn!("Ignoring custom exercise with duplicate id '{}'", extra.id);
                continue;
            }
            entries.push(extra.clone());
        }
        Catalog { entries }
    }

    /// First entry whose normalized name is contained in the normalized `name`
    ///
    /// Substring containment only. Short catalog names can over-match longer
    /// descriptors, so callers must fall back to name-only display.
    pub fn resolve(&self, name: &str) -> Option<&ExerciseCatalogEntry> {
        let normalized = normalize(name);
        if normalized.is_empty() {
            return None;
        }

        let found = self
            .entries
            .iter()
            .find(|e| {
                let entry_name = normalize(&e.name);
                !entry_name.is_empty() && normalized.contains(&entry_name)
            });

        if found.is_none() {
            tracing::debug!("No catalog entry for '{}'", name);
        }
        found
    }

    pub fn find_by_id(&self, id: &str) -> Option<&ExerciseCatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen_ids = HashSet::new();

        for entry in &self.entries {
            if entry.id.is_empty() {
                errors.push(format!("Exercise '{}' has empty ID", entry.name));
            } else if !seen_ids.insert(entry.id.as_str()) {
                errors.push(format!("Duplicate exercise ID '{}'", entry.id));
            }

            if normalize(&entry.name).is_empty() {
                // An empty name would match every descriptor.
                errors.push(format!("Exercise '{}' has empty name", entry.id));
            }
            if entry.tips.is_empty() {
                errors.push(format!("Exercise '{}' has no tips", entry.id));
            }
        }

        errors
    }
}
