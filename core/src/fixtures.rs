//! Sample console data served in fixture mode

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Server {
    pub id: i64,
    pub name: String,
    pub ip: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub server_id: i64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Command {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// Read-only source of console data
pub trait DataProvider: Send + Sync {
    fn servers(&self) -> &[Server];
    fn players(&self) -> &[Player];
    fn commands(&self) -> &[Command];

    fn server(&self, id: i64) -> Option<&Server> {
        self.servers().iter().find(|s| s.id == id)
    }

    fn command(&self, id: i64) -> Option<&Command> {
        self.commands().iter().find(|c| c.id == id)
    }

    /// Players whose `server_id` equals `server_id` exactly
    fn players_on_server(&self, server_id: i64) -> Vec<&Player> {
        self.players()
            .iter()
            .filter(|p| p.server_id == server_id)
            .collect()
    }

    fn players_with_status(&self, status: &str) -> Vec<&Player> {
        self.players().iter().filter(|p| p.status == status).collect()
    }
}

/// The built-in sample lists
#[derive(Debug, Clone)]
pub struct StaticFixtures {
    servers: Vec<Server>,
    players: Vec<Player>,
    commands: Vec<Command>,
}

impl StaticFixtures {
    pub fn new() -> Self {
        let server = |id, name: &str, ip: &str, status: &str| Server {
            id,
            name: name.to_string(),
            ip: ip.to_string(),
            status: status.to_string(),
        };
        let player = |id, name: &str, server_id, status: &str| Player {
            id,
            name: name.to_string(),
            server_id,
            status: status.to_string(),
        };
        let command = |id, name: &str, description: &str| Command {
            id,
            name: name.to_string(),
            description: description.to_string(),
        };

        Self {
            servers: vec![
                server(1, "Server 1", "192.168.1.10", "online"),
                server(2, "Server 2", "192.168.1.11", "online"),
                server(3, "Server 3", "192.168.1.12", "offline"),
            ],
            players: vec![
                player(1, "Player1", 1, "online"),
                player(2, "Player2", 1, "online"),
                player(3, "Player3", 2, "online"),
                player(4, "Player4", 2, "offline"),
            ],
            commands: vec![
                command(1, "restart", "Restart server"),
                command(2, "stop", "Stop server"),
                command(3, "status", "Check server status"),
                command(4, "backup", "Create server backup"),
            ],
        }
    }
}

impl Default for StaticFixtures {
    fn default() -> Self {
        Self::new()
    }
}

impl DataProvider for StaticFixtures {
    fn servers(&self) -> &[Server] {
        &self.servers
    }

    fn players(&self) -> &[Player] {
        &self.players
    }

    fn commands(&self) -> &[Command] {
        &self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique_within_each_list() {
        let fixtures = StaticFixtures::new();
        let server_ids: HashSet<_> = fixtures.servers().iter().map(|s| s.id).collect();
        let player_ids: HashSet<_> = fixtures.players().iter().map(|p| p.id).collect();
        let command_ids: HashSet<_> = fixtures.commands().iter().map(|c| c.id).collect();
        assert_eq!(server_ids.len(), fixtures.servers().len());
        assert_eq!(player_ids.len(), fixtures.players().len());
        assert_eq!(command_ids.len(), fixtures.commands().len());
    }

    #[test]
    fn players_on_server_is_exact_match() {
        let fixtures = StaticFixtures::new();
        let names: Vec<_> = fixtures
            .players_on_server(1)
            .into_iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Player1", "Player2"]);
        assert!(fixtures.players_on_server(3).is_empty());
        assert!(fixtures.players_on_server(99).is_empty());
    }

    #[test]
    fn lookups_by_id() {
        let fixtures = StaticFixtures::new();
        assert_eq!(fixtures.server(3).map(|s| s.status.as_str()), Some("offline"));
        assert_eq!(fixtures.command(4).map(|c| c.name.as_str()), Some("backup"));
        assert!(fixtures.server(0).is_none());
    }

    #[test]
    fn player_serializes_with_snake_case_server_id() {
        let fixtures = StaticFixtures::new();
        let value = serde_json::to_value(&fixtures.players()[2]).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"id": 3, "name": "Player3", "server_id": 2, "status": "online"})
        );
    }
}
