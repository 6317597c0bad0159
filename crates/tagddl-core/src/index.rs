use std::collections::BTreeMap;

use crate::model::{Column, DataModel, Diagram, Entity, Project};

/// Position of a column inside the project graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLocation {
    pub data_model: usize,
    /// `None` when the owning entity belongs directly to the data model.
    pub diagram: Option<usize>,
    pub entity: usize,
    pub column: usize,
}

/// Column resolved together with every element that owns it.
#[derive(Debug, Clone, Copy)]
pub struct ColumnTarget<'a> {
    pub data_model: &'a DataModel,
    pub diagram: Option<&'a Diagram>,
    pub entity: &'a Entity,
    pub column: &'a Column,
}

/// Lookup of columns by id, used to resolve `reference_to` links.
#[derive(Debug, Clone)]
pub struct ModelIndex<'a> {
    project: &'a Project,
    columns: BTreeMap<&'a str, ColumnLocation>,
}

impl<'a> ModelIndex<'a> {
    /// Index every column carrying an id. The first occurrence of an id wins.
    pub fn new(project: &'a Project) -> Self {
        let mut columns = BTreeMap::new();

        for (dm_idx, data_model) in project.data_models.iter().enumerate() {
            for (diagram_idx, diagram) in data_model.diagrams.iter().enumerate() {
                index_entities(&mut columns, dm_idx, Some(diagram_idx), &diagram.entities);
            }
            index_entities(&mut columns, dm_idx, None, &data_model.entities);
        }

        Self { project, columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn locate(&self, id: &str) -> Option<ColumnLocation> {
        self.columns.get(id).copied()
    }

    pub fn resolve(&self, id: &str) -> Option<ColumnTarget<'a>> {
        let location = self.locate(id)?;
        let data_model = self.project.data_models.get(location.data_model)?;
        let (diagram, entities) = match location.diagram {
            Some(idx) => {
                let diagram = data_model.diagrams.get(idx)?;
                (Some(diagram), &diagram.entities)
            }
            None => (None, &data_model.entities),
        };
        let entity = entities.get(location.entity)?;
        let column = entity.columns.get(location.column)?;
        Some(ColumnTarget {
            data_model,
            diagram,
            entity,
            column,
        })
    }
}

fn index_entities<'a>(
    columns: &mut BTreeMap<&'a str, ColumnLocation>,
    data_model: usize,
    diagram: Option<usize>,
    entities: &'a [Entity],
) {
    for (entity_idx, entity) in entities.iter().enumerate() {
        for (column_idx, column) in entity.columns.iter().enumerate() {
            if let Some(id) = column.id.as_deref() {
                columns.entry(id).or_insert(ColumnLocation {
                    data_model,
                    diagram,
                    entity: entity_idx,
                    column: column_idx,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        let users = Entity::new("users").with_column(Column::new("id", "INTEGER").with_id("users.id"));
        let orders = Entity::new("orders")
            .with_column(Column::new("id", "INTEGER").with_id("orders.id"))
            .with_column(Column::new("user_id", "INTEGER").references("users.id"));

        let mut diagram = Diagram::new("core");
        diagram.entities.push(orders);
        let mut data_model = DataModel::new("shop");
        data_model.diagrams.push(diagram);
        data_model.entities.push(users);

        let mut project = Project::new("Shop");
        project.data_models.push(data_model);
        project
    }

    #[test]
    fn resolves_columns_inside_and_outside_diagrams() {
        let project = project();
        let index = ModelIndex::new(&project);
        assert_eq!(index.len(), 2);

        let users = index.resolve("users.id").expect("users.id indexed");
        assert!(users.diagram.is_none());
        assert_eq!(users.entity.name, "users");

        let orders = index.locate("orders.id").expect("orders.id indexed");
        assert_eq!(
            orders,
            ColumnLocation {
                data_model: 0,
                diagram: Some(0),
                entity: 0,
                column: 0,
            }
        );
        assert!(index.resolve("missing").is_none());
    }
}
