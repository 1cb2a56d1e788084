//! PostgreSQL DDL builder.

use crate::config::Engine;
use crate::core::identifier::quote_pg;
use crate::core::schema::{
    CheckConstraint, ForeignKey, Index, TableSchema, Trigger, TriggerTiming, UniqueConstraint,
    ViewSchema,
};
use crate::ddl::{column_type, comment_safe};
use crate::error::Result;
use crate::expr::{ExpressionGenerator, ExpressionNode, PostgresGenerator};
use crate::typemap::TypeService;

pub struct PostgresDdlBuilder {
    generator: PostgresGenerator,
}

impl PostgresDdlBuilder {
    pub fn new() -> Self {
        PostgresDdlBuilder {
            generator: PostgresGenerator,
        }
    }

    /// CREATE TABLE with columns, identity types, defaults, and the
    /// primary key. Secondary constraints are applied separately after
    /// data transfer.
    pub fn create_table(
        &self,
        table: &TableSchema,
        types: &TypeService,
        source: Engine,
    ) -> Result<String> {
        let mut lines = Vec::with_capacity(table.columns.len() + 1);
        for column in &table.columns {
            let mut type_text = column_type(column, types, source, Engine::Postgres)?;
            if column.is_identity {
                let generic = types.source_generic(&column.data_type, source)?;
                if let Some(serial) = types.auto_increment(generic, Engine::Postgres)? {
                    type_text = serial;
                }
            }
            let mut line = format!("  {} {}", quote_pg(&column.name), type_text);
            if !column.is_nullable {
                line.push_str(" NOT NULL");
            }
            // Identity columns generate their own values; a translated
            // default would fight the sequence.
            if !column.is_identity {
                if let Some(ast) = &column.default_ast {
                    line.push_str(&format!(" DEFAULT {}", self.generator.generate(ast)?));
                }
            }
            lines.push(line);
        }
        if !table.primary_key.is_empty() {
            let cols: Vec<String> = table.primary_key.iter().map(|c| quote_pg(c)).collect();
            lines.push(format!("  PRIMARY KEY ({})", cols.join(", ")));
        }
        Ok(format!(
            "CREATE TABLE {} (\n{}\n);",
            quote_pg(&table.name),
            lines.join(",\n")
        ))
    }

    pub fn create_index(&self, table: &TableSchema, index: &Index) -> String {
        let cols: Vec<String> = index
            .columns
            .iter()
            .map(|c| {
                format!(
                    "{} {}",
                    quote_pg(&c.name),
                    if c.ascending { "ASC" } else { "DESC" }
                )
            })
            .collect();
        format!(
            "CREATE {}INDEX {} ON {} ({});",
            if index.is_unique { "UNIQUE " } else { "" },
            quote_pg(&index.name),
            quote_pg(&table.name),
            cols.join(", ")
        )
    }

    pub fn add_unique(&self, table: &TableSchema, constraint: &UniqueConstraint) -> String {
        let cols: Vec<String> = constraint.columns.iter().map(|c| quote_pg(c)).collect();
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} UNIQUE ({});",
            quote_pg(&table.name),
            quote_pg(&constraint.name),
            cols.join(", ")
        )
    }

    pub fn add_foreign_key(&self, table: &TableSchema, fk: &ForeignKey) -> String {
        let cols: Vec<String> = fk.columns.iter().map(|c| quote_pg(c)).collect();
        let ref_cols: Vec<String> = fk.ref_columns.iter().map(|c| quote_pg(c)).collect();
        let mut sql = format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            quote_pg(&table.name),
            quote_pg(&fk.name),
            cols.join(", "),
            quote_pg(&fk.ref_table),
            ref_cols.join(", ")
        );
        // NO ACTION is the default; spelling it out adds noise.
        if let Some(action) = fk.on_delete.as_deref().filter(|a| !a.eq_ignore_ascii_case("NO ACTION")) {
            sql.push_str(&format!(" ON DELETE {}", action));
        }
        if let Some(action) = fk.on_update.as_deref().filter(|a| !a.eq_ignore_ascii_case("NO ACTION")) {
            sql.push_str(&format!(" ON UPDATE {}", action));
        }
        sql.push(';');
        sql
    }

    pub fn add_check(&self, table: &TableSchema, check: &CheckConstraint) -> Result<String> {
        let ast = check
            .check_ast
            .clone()
            .unwrap_or_else(|| ExpressionNode::raw(&check.definition));
        Ok(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} CHECK ({});",
            quote_pg(&table.name),
            quote_pg(&check.name),
            self.generator.generate(&ast)?
        ))
    }

    /// Placeholder trigger: the original body is procedural source SQL and
    /// is preserved in a comment for manual porting.
    pub fn create_trigger_placeholder(&self, trigger: &Trigger) -> String {
        let fn_name = format!("{}_fn", trigger.name);
        // INSTEAD OF only applies to views here; downgrade to AFTER.
        let (timing, timing_note) = match trigger.timing {
            TriggerTiming::Before => ("BEFORE", ""),
            TriggerTiming::After => ("AFTER", ""),
            TriggerTiming::InsteadOf => ("AFTER", " (downgraded from INSTEAD OF)"),
        };
        let return_value = match trigger.timing {
            TriggerTiming::Before => "NEW",
            _ => "NULL",
        };
        format!(
            "/* Placeholder for trigger {name}{note}. Original body:\n{body}\n*/\n\
             CREATE OR REPLACE FUNCTION {fn_ident}() RETURNS trigger AS $$\n\
             BEGIN\n  RETURN {ret};\nEND;\n$$ LANGUAGE plpgsql;\n\
             CREATE TRIGGER {trg_ident} {timing} {event} ON {table} FOR EACH ROW EXECUTE FUNCTION {fn_ident}();",
            name = trigger.name,
            note = timing_note,
            body = comment_safe(&trigger.body),
            fn_ident = quote_pg(&fn_name),
            ret = return_value,
            trg_ident = quote_pg(&trigger.name),
            timing = timing,
            event = trigger.event.as_sql(),
            table = quote_pg(&trigger.table),
        )
    }

    /// Placeholder view carrying the original definition in a comment.
    pub fn create_view_placeholder(&self, view: &ViewSchema) -> String {
        format!(
            "/* Placeholder for view {name}. Original definition:\n{definition}\n*/\n\
             CREATE VIEW {ident} AS SELECT 1 AS placeholder;",
            name = view.name,
            definition = comment_safe(&view.definition),
            ident = quote_pg(&view.name),
        )
    }
}

impl Default for PostgresDdlBuilder {
    fn default() -> Self {
        Self::new()
    }
}
