pub mod bug_game;
pub mod match_game;

pub struct GameDescriptor
{
    pub name: &'static str,
    pub description: &'static str,
}

pub fn registry() -> Vec<GameDescriptor>
{
    vec![GameDescriptor {
        name: "bug",
        description: "Track a hidden bug and call out when it escapes the grid",
    },
    GameDescriptor {
        name: "match",
        description: "Memorize which way the matches point",
    }]
}

pub fn find(name: &str) -> Option<GameDescriptor>
{
    registry()
        .into_iter()
        .find(|game| game.name.eq_ignore_ascii_case(name))
}
