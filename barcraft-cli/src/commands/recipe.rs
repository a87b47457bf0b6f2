use clap::{Args, Subcommand};
use std::collections::BTreeMap;
use std::io::{self, Write};

use barcraft_core::{Autosave, CloseDecision, CloseOutcome, Ingredient, Recipe};

use super::{parse_uuid, OutputFormat};
use crate::config::Config;
use crate::repo::Workspace;

#[derive(Args)]
pub struct RecipeCommand {
    #[command(subcommand)]
    pub command: RecipeSubcommand,
}

#[derive(Subcommand)]
pub enum RecipeSubcommand {
    /// Create a new recipe (the root version of a family)
    Add {
        /// Recipe name
        name: String,

        /// Ingredient as NAME:AMOUNT:UNIT (can be repeated)
        #[arg(long = "ingredient", short = 'i', value_name = "INGREDIENT")]
        ingredients: Vec<String>,

        /// Preparation instructions
        #[arg(long)]
        instructions: Option<String>,

        /// Category (e.g. Sour, Spirit-forward)
        #[arg(long)]
        category: Option<String>,

        /// Glassware
        #[arg(long)]
        glassware: Option<String>,

        /// Garnish
        #[arg(long)]
        garnish: Option<String>,

        /// Preparation time in minutes
        #[arg(long)]
        prep_time: Option<i32>,

        /// Difficulty (e.g. Easy, Advanced)
        #[arg(long)]
        difficulty: Option<String>,

        /// Yield (e.g. "1 cocktail")
        #[arg(long)]
        yields: Option<String>,

        /// Tags, comma separated
        #[arg(long)]
        tags: Option<String>,

        /// Flavor profile, comma separated
        #[arg(long)]
        flavor: Option<String>,
    },

    /// List recipe families and their versions
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one recipe version
    Show {
        /// Version ID (UUID)
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Edit a version; changes are autosaved as a draft unless --save
    Edit {
        /// Version ID (UUID)
        id: String,

        /// Field change as KEY=VALUE (can be repeated). Keys: category,
        /// glassware, garnish, prep_time, difficulty, yields, tags, flavor,
        /// instructions, version_name, change_description,
        /// ingredient (NAME:AMOUNT:UNIT, upserted by name)
        #[arg(long = "set", short = 's', value_name = "KEY=VALUE")]
        sets: Vec<String>,

        /// Persist edits to the recipe itself instead of leaving a draft
        #[arg(long)]
        save: bool,

        /// Discard the edits and any existing draft
        #[arg(long)]
        discard: bool,

        /// Skip the draft-restore prompt and ignore any existing draft
        #[arg(long)]
        ignore_draft: bool,
    },
}

impl RecipeCommand {
    pub fn run(
        &self,
        workspace: &Workspace,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            RecipeSubcommand::Add {
                name,
                ingredients,
                instructions,
                category,
                glassware,
                garnish,
                prep_time,
                difficulty,
                yields,
                tags,
                flavor,
            } => self.add(
                workspace,
                config,
                name,
                ingredients,
                instructions,
                category,
                glassware,
                garnish,
                prep_time,
                difficulty,
                yields,
                tags,
                flavor,
            ),
            RecipeSubcommand::List { format } => self.list(workspace, format),
            RecipeSubcommand::Show { id, format } => self.show(workspace, id, format),
            RecipeSubcommand::Edit {
                id,
                sets,
                save,
                discard,
                ignore_draft,
            } => self.edit(workspace, id, sets, *save, *discard, *ignore_draft),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn add(
        &self,
        workspace: &Workspace,
        config: &Config,
        name: &str,
        ingredients: &[String],
        instructions: &Option<String>,
        category: &Option<String>,
        glassware: &Option<String>,
        garnish: &Option<String>,
        prep_time: &Option<i32>,
        difficulty: &Option<String>,
        yields: &Option<String>,
        tags: &Option<String>,
        flavor: &Option<String>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut recipe = Recipe::new(name, &config.author.value);

        let parsed: Result<Vec<Ingredient>, String> =
            ingredients.iter().map(|s| parse_ingredient(s)).collect();
        recipe.ingredients = parsed?;

        if let Some(text) = instructions {
            recipe = recipe.with_instructions(text.as_str());
        }
        if let Some(category) = category {
            recipe = recipe.with_category(category);
        }
        if let Some(glassware) = glassware {
            recipe = recipe.with_glassware(glassware);
        }
        if let Some(garnish) = garnish {
            recipe = recipe.with_garnish(garnish);
        }
        if let Some(minutes) = prep_time {
            recipe = recipe.with_prep_time(*minutes);
        }
        if let Some(difficulty) = difficulty {
            recipe = recipe.with_difficulty(difficulty);
        }
        if let Some(yields) = yields {
            recipe = recipe.with_yields(yields);
        }
        if let Some(tags) = tags {
            recipe = recipe.with_tags(split_list(tags));
        }
        if let Some(flavor) = flavor {
            recipe = recipe.with_flavor_profile(split_list(flavor));
        }

        let manager = workspace.manager()?;
        let created = manager.create_root(recipe)?;
        workspace.save_ledger(&manager)?;

        println!(
            "Created '{}' {} ({})",
            created.name, created.version.version_number, created.id
        );
        Ok(())
    }

    fn list(
        &self,
        workspace: &Workspace,
        format: &OutputFormat,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let manager = workspace.manager()?;
        let recipes = manager.all_versions()?;

        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&recipes)?),
            OutputFormat::Text => {
                if recipes.is_empty() {
                    println!("No recipes yet. Create one with 'bar recipe add'.");
                    return Ok(());
                }
                let mut families: BTreeMap<String, Vec<&Recipe>> = BTreeMap::new();
                for recipe in &recipes {
                    families.entry(recipe.family_key()).or_default().push(recipe);
                }
                for (_, versions) in families {
                    println!("{}", versions[0].name);
                    for recipe in versions {
                        let main = if recipe.version.is_main { " *" } else { "" };
                        println!(
                            "  {} [{}]{} {}",
                            recipe.version.version_number, recipe.version.status, main, recipe.id
                        );
                    }
                }
            }
        }
        Ok(())
    }

    fn show(
        &self,
        workspace: &Workspace,
        id: &str,
        format: &OutputFormat,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let id = parse_uuid(id)?;
        let manager = workspace.manager()?;
        let recipe = manager
            .all_versions()?
            .into_iter()
            .find(|recipe| recipe.id == id)
            .ok_or_else(|| format!("Recipe not found: {}", id))?;

        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&recipe)?),
            OutputFormat::Text => print!("{}", recipe),
        }
        Ok(())
    }

    fn edit(
        &self,
        workspace: &Workspace,
        id: &str,
        sets: &[String],
        save: bool,
        discard: bool,
        ignore_draft: bool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let id = parse_uuid(id)?;
        let manager = workspace.manager()?;
        let stored = manager
            .all_versions()?
            .into_iter()
            .find(|recipe| recipe.id == id)
            .ok_or_else(|| format!("Recipe not found: {}", id))?;

        let rt = tokio::runtime::Runtime::new()?;
        let _guard = rt.enter();
        let mut autosave = Autosave::new(workspace.draft_store(), id, workspace.autosave_options());

        // Reconcile with any leftover draft before editing
        let mut base = stored;
        if !ignore_draft {
            if let Some(draft) = autosave.load_draft()? {
                print!(
                    "An unsaved draft from {} exists. Restore it? [y/N]: ",
                    draft.saved_at.format("%Y-%m-%d %H:%M")
                );
                io::stdout().flush()?;
                let mut input = String::new();
                io::stdin().read_line(&mut input)?;
                if input.trim().eq_ignore_ascii_case("y") {
                    if let Some(snapshot) = autosave.restore_draft()? {
                        base = snapshot;
                        println!("Draft restored.");
                    }
                }
            }
        }

        if discard {
            autosave.close(CloseDecision::Discard)?;
            println!("Edits discarded.");
            return Ok(());
        }

        let mut edited = base;
        for set in sets {
            apply_set(&mut edited, set)?;
        }
        autosave.record(edited);

        if save {
            match autosave.close(CloseDecision::SaveAndClose)? {
                CloseOutcome::SaveRequired(snapshot) => {
                    let updated = manager.update_version(*snapshot)?;
                    autosave.clear_draft()?;
                    workspace.save_ledger(&manager)?;
                    println!(
                        "Saved '{}' {}",
                        updated.name, updated.version.version_number
                    );
                }
                CloseOutcome::Closed => println!("Nothing to save."),
                CloseOutcome::KeptOpen => {}
            }
        } else {
            let state = autosave.flush();
            match state.error {
                Some(error) => println!("Draft not saved: {}", error),
                None => println!("Draft saved. Apply it later with 'bar draft apply {}'.", id),
            }
        }
        Ok(())
    }
}

fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parses "NAME:AMOUNT:UNIT" (unit optional).
fn parse_ingredient(input: &str) -> Result<Ingredient, String> {
    let parts: Vec<&str> = input.splitn(3, ':').collect();
    if parts.len() < 2 || parts[0].trim().is_empty() {
        return Err(format!(
            "Invalid ingredient '{}'. Use NAME:AMOUNT:UNIT, e.g. Bourbon:2:oz",
            input
        ));
    }
    let amount: f64 = parts[1]
        .trim()
        .parse()
        .map_err(|_| format!("Invalid amount in '{}'", input))?;
    let unit = parts.get(2).map(|s| s.trim()).unwrap_or("");
    Ok(Ingredient::new(parts[0].trim(), amount, unit))
}

fn apply_set(recipe: &mut Recipe, set: &str) -> Result<(), String> {
    let (key, value) = set
        .split_once('=')
        .ok_or_else(|| format!("Invalid --set '{}'. Use KEY=VALUE.", set))?;
    let value = value.trim();

    match key.trim() {
        "category" => recipe.category = non_empty(value),
        "glassware" => recipe.glassware = non_empty(value),
        "garnish" => recipe.garnish = non_empty(value),
        "difficulty" => recipe.difficulty = non_empty(value),
        "yields" => recipe.yields = non_empty(value),
        "prep_time" => {
            recipe.prep_time = if value.is_empty() {
                None
            } else {
                Some(
                    value
                        .parse()
                        .map_err(|_| format!("Invalid prep_time '{}'", value))?,
                )
            }
        }
        "tags" => recipe.tags = split_list(value),
        "flavor" => recipe.flavor_profile = split_list(value),
        "instructions" => recipe.instructions = value.into(),
        "version_name" => recipe.version.version_name = value.to_string(),
        "change_description" => recipe.version.change_description = value.to_string(),
        "ingredient" => {
            let ingredient = parse_ingredient(value)?;
            match recipe
                .ingredients
                .iter_mut()
                .find(|existing| existing.key() == ingredient.key())
            {
                Some(existing) => *existing = ingredient,
                None => recipe.ingredients.push(ingredient),
            }
        }
        other => return Err(format!("Unknown field '{}'", other)),
    }
    Ok(())
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
