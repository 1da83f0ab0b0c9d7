//! The command tree.
//!
//! Commands are registered into a [`CommandRegistry`] before dispatch. Each
//! [`CommandNode`] pairs a `clap::Command` (name, help, local flags) with its
//! children and, for leaves, a [`CommandHandler`]. Once dispatch starts the
//! registry is sealed and further registration fails.

use std::{fmt, sync::Arc};

use clap::{Arg, Command};

use crate::{context::CommandHandler, error::RegistryError};

/// A command and the subtree below it.
#[derive(Clone)]
pub struct CommandNode {
    command: Command,
    children: Vec<CommandNode>,
    handler: Option<Arc<dyn CommandHandler>>,
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name())
            .field("children", &self.children)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

impl CommandNode {
    /// A runnable command.
    pub fn leaf(command: Command, handler: impl CommandHandler + 'static) -> Self {
        Self {
            command,
            children: Vec::new(),
            handler: Some(Arc::new(handler)),
        }
    }

    /// A command that only groups subcommands.
    pub fn group(command: Command) -> Self {
        Self {
            command,
            children: Vec::new(),
            handler: None,
        }
    }

    /// Builder form of [`add_child`](Self::add_child).
    pub fn with_child(mut self, child: CommandNode) -> Result<Self, RegistryError> {
        self.add_child(child)?;
        Ok(self)
    }

    /// Attach `child`, rejecting a name or alias already taken by a sibling.
    pub fn add_child(&mut self, child: CommandNode) -> Result<(), RegistryError> {
        if self.handler.is_some() {
            return Err(RegistryError::LeafParent(self.name().to_string()));
        }
        let taken = child.names().find(|name| {
            self.children
                .iter()
                .any(|sibling| sibling.names().any(|other| other == *name))
        });
        if let Some(name) = taken {
            return Err(RegistryError::DuplicateCommand {
                parent: self.name().to_string(),
                name: name.to_string(),
            });
        }
        self.children.push(child);
        Ok(())
    }

    pub fn name(&self) -> &str {
        self.command.get_name()
    }

    pub fn children(&self) -> &[CommandNode] {
        &self.children
    }

    pub fn handler(&self) -> Option<&Arc<dyn CommandHandler>> {
        self.handler.as_ref()
    }

    /// Direct child called `name`.
    pub fn child(&self, name: &str) -> Option<&CommandNode> {
        self.children.iter().find(|c| c.name() == name)
    }

    /// Descendant at `path`, relative to this node.
    pub fn find(&self, path: &[&str]) -> Option<&CommandNode> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => self.child(first)?.find(rest),
        }
    }

    fn find_mut(&mut self, path: &[&str]) -> Option<&mut CommandNode> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => self
                .children
                .iter_mut()
                .find(|c| c.name() == *first)?
                .find_mut(rest),
        }
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name()).chain(self.command.get_all_aliases())
    }

    fn validate(&self, path: &mut Vec<String>) -> Result<(), RegistryError> {
        path.push(self.name().to_string());
        if self.children.is_empty() && self.handler.is_none() {
            return Err(RegistryError::MissingHandler(path.join(" ")));
        }
        for child in &self.children {
            child.validate(path)?;
        }
        path.pop();
        Ok(())
    }

    fn to_command(&self) -> Command {
        let command = self.command.clone();
        if self.children.is_empty() {
            return command;
        }
        command
            .subcommand_required(true)
            .arg_required_else_help(true)
            .subcommands(self.children.iter().map(CommandNode::to_command))
    }
}

/// The whole command tree, rooted at the program's top-level command.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    root: CommandNode,
    sealed: bool,
}

impl CommandRegistry {
    pub fn new(root: Command) -> Self {
        Self {
            root: CommandNode::group(root),
            sealed: false,
        }
    }

    /// Add `child` below the command at `parent` (empty for the root).
    pub fn register(&mut self, parent: &[&str], child: CommandNode) -> Result<(), RegistryError> {
        if self.sealed {
            return Err(RegistryError::Sealed(child.name().to_string()));
        }
        let node = self
            .root
            .find_mut(parent)
            .ok_or_else(|| RegistryError::UnknownParent(parent.join(" ")))?;
        node.add_child(child)
    }

    /// Add a flag accepted at every level of the tree.
    pub fn register_global_flag(&mut self, flag: Arg) -> Result<(), RegistryError> {
        let id = flag.get_id().to_string();
        if self.sealed {
            return Err(RegistryError::Sealed(id));
        }
        let clash = self.root.command.get_arguments().any(|existing| {
            existing.get_id() == flag.get_id()
                || (flag.get_long().is_some() && existing.get_long() == flag.get_long())
                || (flag.get_short().is_some() && existing.get_short() == flag.get_short())
        });
        if clash {
            return Err(RegistryError::DuplicateFlag(id));
        }
        let root = std::mem::take(&mut self.root.command);
        self.root.command = root.arg(flag.global(true));
        Ok(())
    }

    /// Validate the tree and freeze it. Idempotent.
    pub fn seal(&mut self) -> Result<(), RegistryError> {
        if !self.sealed {
            for child in &self.root.children {
                child.validate(&mut vec![self.root.name().to_string()])?;
            }
            self.sealed = true;
        }
        Ok(())
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn root(&self) -> &CommandNode {
        &self.root
    }

    /// Assemble the `clap::Command` for the whole tree.
    pub fn command(&self) -> Command {
        self.root.to_command()
    }
}

/// Flags of a derived `clap::Args` struct, ready for
/// [`CommandRegistry::register_global_flag`].
pub fn flags_of<A: clap::Args>() -> Vec<Arg> {
    A::augment_args(Command::new("flags"))
        .get_arguments()
        .cloned()
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        context::CommandContext,
        error::CommandError,
    };
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use clap::ArgMatches;

    pub(crate) struct Noop;

    #[async_trait]
    impl CommandHandler for Noop {
        async fn run(&self, _: &CommandContext<'_>, _: &ArgMatches) -> Result<(), CommandError> {
            Ok(())
        }
    }

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new(Command::new("nodectl"));
        registry
            .register(&[], CommandNode::group(Command::new("config")))
            .unwrap();
        registry
            .register(&["config"], CommandNode::leaf(Command::new("info"), Noop))
            .unwrap();
        registry
    }

    #[test]
    fn test_duplicate_sibling_is_rejected() {
        let mut registry = registry();

        let err = registry
            .register(&["config"], CommandNode::leaf(Command::new("info"), Noop))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateCommand {
                parent: "config".into(),
                name: "info".into()
            }
        );
        assert_eq!(registry.root().find(&["config"]).unwrap().children().len(), 1);
    }

    #[test]
    fn test_alias_collision_is_rejected() {
        let mut registry = registry();
        let aliased = Command::new("describe").alias("info");

        assert_matches!(
            registry.register(&["config"], CommandNode::leaf(aliased, Noop)),
            Err(RegistryError::DuplicateCommand { name, .. }) if name == "info"
        );
    }

    #[test]
    fn test_same_name_under_different_parents() {
        let mut registry = registry();
        registry
            .register(&[], CommandNode::leaf(Command::new("info"), Noop))
            .unwrap();

        assert!(registry.root().find(&["info"]).is_some());
        assert!(registry.root().find(&["config", "info"]).is_some());
    }

    #[test]
    fn test_unknown_parent() {
        let mut registry = registry();
        assert_matches!(
            registry.register(&["cluster", "create"], CommandNode::leaf(Command::new("x"), Noop)),
            Err(RegistryError::UnknownParent(path)) if path == "cluster create"
        );
    }

    #[test]
    fn test_leaf_cannot_take_children() {
        let mut registry = registry();
        assert_matches!(
            registry.register(&["config", "info"], CommandNode::leaf(Command::new("x"), Noop)),
            Err(RegistryError::LeafParent(name)) if name == "info"
        );
    }

    #[test]
    fn test_seal_requires_handlers() {
        let mut registry = registry();
        registry
            .register(&["config"], CommandNode::group(Command::new("empty")))
            .unwrap();

        assert_matches!(
            registry.seal(),
            Err(RegistryError::MissingHandler(path)) if path == "nodectl config empty"
        );
        assert!(!registry.is_sealed());
    }

    #[test]
    fn test_sealed_registry_rejects_changes() {
        let mut registry = registry();
        registry.seal().unwrap();
        registry.seal().unwrap();

        assert_matches!(
            registry.register(&[], CommandNode::leaf(Command::new("late"), Noop)),
            Err(RegistryError::Sealed(name)) if name == "late"
        );
        assert_matches!(
            registry.register_global_flag(Arg::new("late").long("late")),
            Err(RegistryError::Sealed(_))
        );
    }

    #[test]
    fn test_global_flags_reach_leaves() {
        let mut registry = registry();
        registry
            .register_global_flag(Arg::new("context").long("context"))
            .unwrap();
        assert_matches!(
            registry.register_global_flag(Arg::new("ctx").long("context")),
            Err(RegistryError::DuplicateFlag(id)) if id == "ctx"
        );

        let matches = registry
            .command()
            .try_get_matches_from(["nodectl", "config", "info", "--context", "lab"])
            .unwrap();
        let (_, config) = matches.subcommand().unwrap();
        let (_, info) = config.subcommand().unwrap();
        assert_eq!(info.get_one::<String>("context").map(String::as_str), Some("lab"));
    }

    #[test]
    fn test_groups_require_a_subcommand() {
        let err = registry()
            .command()
            .try_get_matches_from(["nodectl", "config"])
            .unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
    }
}
