//! Schema types and builders
//!
//! Every attribute this provider exposes is a string, so an attribute is
//! described only by its flags.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Increment when a change to the attributes requires state migration
    pub version: i64,
    pub description: String,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Attributes a practitioner can set in configuration
    pub fn configurable(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|a| a.required || a.optional)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    /// A change to this attribute forces delete-then-create
    pub requires_replace: bool,
}

pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                requires_replace: false,
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn requires_replace(mut self) -> Self {
        self.attribute.requires_replace = true;
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

#[derive(Default)]
pub struct SchemaBuilder {
    version: i64,
    description: String,
    attributes: Vec<Attribute>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.attributes.push(attr);
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            version: self.version,
            description: self.description,
            attributes: self.attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_flags() {
        let schema = SchemaBuilder::new()
            .version(1)
            .description("test")
            .attribute(AttributeBuilder::new("id").computed().build())
            .attribute(
                AttributeBuilder::new("domain")
                    .description("Domain name")
                    .required()
                    .requires_replace()
                    .build(),
            )
            .attribute(AttributeBuilder::new("token").optional().sensitive().build())
            .build();

        assert_eq!(schema.version, 1);
        let domain = schema.attribute("domain").unwrap();
        assert!(domain.required && domain.requires_replace && !domain.optional);
        assert!(schema.attribute("token").unwrap().sensitive);
        assert!(schema.attribute("missing").is_none());
    }

    #[test]
    fn required_and_optional_are_exclusive() {
        let attr = AttributeBuilder::new("url").required().optional().build();
        assert!(attr.optional);
        assert!(!attr.required);
    }

    #[test]
    fn configurable_skips_computed_only_attributes() {
        let schema = SchemaBuilder::new()
            .attribute(AttributeBuilder::new("id").computed().build())
            .attribute(AttributeBuilder::new("ip").required().build())
            .build();

        let names: Vec<_> = schema.configurable().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["ip"]);
    }
}
