use serde::{Deserialize, Serialize};

use crate::model::{Column, DataModel, Diagram, Entity, Project};
use crate::tags::Tag;

/// Discriminant of a model element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Project,
    DataModel,
    Diagram,
    Entity,
    Column,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Project => "project",
            NodeKind::DataModel => "data model",
            NodeKind::Diagram => "diagram",
            NodeKind::Entity => "entity",
            NodeKind::Column => "column",
        }
    }
}

/// Borrowed view over any tagged element of the model graph.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Project(&'a Project),
    DataModel(&'a DataModel),
    Diagram(&'a Diagram),
    Entity(&'a Entity),
    Column(&'a Column),
}

impl<'a> Node<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Project(_) => NodeKind::Project,
            Node::DataModel(_) => NodeKind::DataModel,
            Node::Diagram(_) => NodeKind::Diagram,
            Node::Entity(_) => NodeKind::Entity,
            Node::Column(_) => NodeKind::Column,
        }
    }

    /// Display name as entered in the model.
    pub fn name(&self) -> &'a str {
        match self {
            Node::Project(project) => &project.name,
            Node::DataModel(data_model) => &data_model.name,
            Node::Diagram(diagram) => &diagram.name,
            Node::Entity(entity) => &entity.name,
            Node::Column(column) => &column.name,
        }
    }

    pub fn tags(&self) -> &'a [Tag] {
        match self {
            Node::Project(project) => &project.tags,
            Node::DataModel(data_model) => &data_model.tags,
            Node::Diagram(diagram) => &diagram.tags,
            Node::Entity(entity) => &entity.tags,
            Node::Column(column) => &column.tags,
        }
    }

    /// Free-text documentation; diagrams carry none.
    pub fn documentation(&self) -> Option<&'a str> {
        let text = match self {
            Node::Project(project) => project.documentation.as_deref(),
            Node::DataModel(data_model) => data_model.documentation.as_deref(),
            Node::Diagram(_) => None,
            Node::Entity(entity) => entity.documentation.as_deref(),
            Node::Column(column) => column.documentation.as_deref(),
        };
        text.filter(|text| !text.trim().is_empty())
    }

    /// Direct children in declaration order. Data models list diagrams before
    /// their directly owned entities.
    pub fn children(&self) -> Vec<Node<'a>> {
        match self {
            Node::Project(project) => project.data_models.iter().map(Node::DataModel).collect(),
            Node::DataModel(data_model) => data_model
                .diagrams
                .iter()
                .map(Node::Diagram)
                .chain(data_model.entities.iter().map(Node::Entity))
                .collect(),
            Node::Diagram(diagram) => diagram.entities.iter().map(Node::Entity).collect(),
            Node::Entity(entity) => entity.columns.iter().map(Node::Column).collect(),
            Node::Column(_) => Vec::new(),
        }
    }

    /// Human-readable label used in diagnostics, e.g. `entity 'Order Item!'`.
    pub fn label(&self) -> String {
        format!("{} '{}'", self.kind().as_str(), self.name())
    }
}

impl<'a> From<&'a Project> for Node<'a> {
    fn from(value: &'a Project) -> Self {
        Node::Project(value)
    }
}

impl<'a> From<&'a DataModel> for Node<'a> {
    fn from(value: &'a DataModel) -> Self {
        Node::DataModel(value)
    }
}

impl<'a> From<&'a Diagram> for Node<'a> {
    fn from(value: &'a Diagram) -> Self {
        Node::Diagram(value)
    }
}

impl<'a> From<&'a Entity> for Node<'a> {
    fn from(value: &'a Entity) -> Self {
        Node::Entity(value)
    }
}

impl<'a> From<&'a Column> for Node<'a> {
    fn from(value: &'a Column) -> Self {
        Node::Column(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_model_children_list_diagrams_first() {
        let mut data_model = DataModel::new("sales");
        data_model.entities.push(Entity::new("loose"));
        let mut diagram = Diagram::new("core");
        diagram.entities.push(Entity::new("orders"));
        data_model.diagrams.push(diagram);

        let kinds: Vec<NodeKind> = Node::from(&data_model)
            .children()
            .iter()
            .map(Node::kind)
            .collect();
        assert_eq!(kinds, vec![NodeKind::Diagram, NodeKind::Entity]);
    }

    #[test]
    fn blank_documentation_reads_as_none() {
        let entity = Entity::new("orders").with_documentation("   ");
        assert!(Node::from(&entity).documentation().is_none());
        assert_eq!(Node::from(&entity).label(), "entity 'orders'");
    }
}
