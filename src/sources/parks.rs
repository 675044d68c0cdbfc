use crate::db::models::{ParkFactor, RoofType};

use crate::db::models::RoofType::{Dome as D, Open as O, Retractable as R};

/// (team, stadium, city, run factor, home-run factor, altitude ft, roof)
const BALLPARKS: &[(&str, &str, &str, f64, f64, u32, RoofType)] = &[
    ("Arizona Diamondbacks", "Chase Field", "Phoenix,AZ", 102.0, 106.0, 1086, R),
    ("Atlanta Braves", "Truist Park", "Atlanta,GA", 99.0, 98.0, 1050, O),
    ("Baltimore Orioles", "Oriole Park at Camden Yards", "Baltimore,MD", 104.0, 109.0, 33, O),
    ("Boston Red Sox", "Fenway Park", "Boston,MA", 103.0, 101.0, 20, O),
    ("Chicago Cubs", "Wrigley Field", "Chicago,IL", 107.0, 110.0, 595, O),
    ("Chicago White Sox", "Guaranteed Rate Field", "Chicago,IL", 101.0, 103.0, 595, O),
    ("Cincinnati Reds", "Great American Ball Park", "Cincinnati,OH", 106.0, 112.0, 550, O),
    ("Cleveland Guardians", "Progressive Field", "Cleveland,OH", 98.0, 95.0, 653, O),
    ("Colorado Rockies", "Coors Field", "Denver,CO", 115.0, 124.0, 5200, O),
    ("Detroit Tigers", "Comerica Park", "Detroit,MI", 96.0, 92.0, 585, O),
    ("Houston Astros", "Minute Maid Park", "Houston,TX", 101.0, 100.0, 43, R),
    ("Kansas City Royals", "Kauffman Stadium", "Kansas City,MO", 99.0, 97.0, 910, O),
    ("Los Angeles Angels", "Angel Stadium", "Anaheim,CA", 98.0, 97.0, 160, O),
    ("Los Angeles Dodgers", "Dodger Stadium", "Los Angeles,CA", 97.0, 96.0, 340, O),
    ("Miami Marlins", "loanDepot park", "Miami,FL", 95.0, 94.0, 10, R),
    ("Milwaukee Brewers", "American Family Field", "Milwaukee,WI", 101.0, 100.0, 635, R),
    ("Minnesota Twins", "Target Field", "Minneapolis,MN", 100.0, 101.0, 840, O),
    ("New York Mets", "Citi Field", "New York,NY", 97.0, 95.0, 14, O),
    ("New York Yankees", "Yankee Stadium", "New York,NY", 103.0, 108.0, 55, O),
    ("Oakland Athletics", "Oakland Coliseum", "Oakland,CA", 97.0, 96.0, 25, O),
    ("Philadelphia Phillies", "Citizens Bank Park", "Philadelphia,PA", 104.0, 107.0, 39, O),
    ("Pittsburgh Pirates", "PNC Park", "Pittsburgh,PA", 98.0, 97.0, 730, O),
    ("San Diego Padres", "Petco Park", "San Diego,CA", 94.0, 93.0, 20, O),
    ("San Francisco Giants", "Oracle Park", "San Francisco,CA", 92.0, 88.0, 10, O),
    ("Seattle Mariners", "T-Mobile Park", "Seattle,WA", 97.0, 95.0, 10, R),
    ("St. Louis Cardinals", "Busch Stadium", "St. Louis,MO", 100.0, 100.0, 465, O),
    ("Tampa Bay Rays", "Tropicana Field", "St. Petersburg,FL", 96.0, 97.0, 12, D),
    ("Texas Rangers", "Globe Life Field", "Arlington,TX", 105.0, 108.0, 551, R),
    ("Toronto Blue Jays", "Rogers Centre", "Toronto,ON", 101.0, 102.0, 300, R),
    ("Washington Nationals", "Nationals Park", "Washington,DC", 99.0, 100.0, 25, O),
];

/// Static ballpark data, looked up by team or stadium name
#[derive(Debug, Clone)]
pub struct ParkFactorTable {
    parks: Vec<ParkFactor>,
}

impl Default for ParkFactorTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ParkFactorTable {
    /// The 30 major-league parks
    pub fn builtin() -> Self {
        let parks = BALLPARKS
            .iter()
            .map(|&(team, stadium, city, run_factor, hr_factor, altitude_ft, roof)| ParkFactor {
                team: team.to_string(),
                stadium: stadium.to_string(),
                city: city.to_string(),
                run_factor,
                hr_factor,
                altitude_ft,
                roof,
            })
            .collect();
        ParkFactorTable { parks }
    }

    pub fn from_parks(parks: Vec<ParkFactor>) -> Self {
        ParkFactorTable { parks }
    }

    /// Case-insensitive match on team, stadium or a unique team nickname
    pub fn get(&self, name: &str) -> Option<&ParkFactor> {
        let query = name.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        if let Some(park) = self.parks.iter().find(|p| {
            p.team.to_lowercase() == query || p.stadium.to_lowercase() == query
        }) {
            return Some(park);
        }
        let suffix = format!(" {}", query);
        let mut matches = self
            .parks
            .iter()
            .filter(|p| p.team.to_lowercase().ends_with(&suffix));
        match (matches.next(), matches.next()) {
            (Some(park), None) => Some(park),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParkFactor> {
        self.parks.iter()
    }

    pub fn len(&self) -> usize {
        self.parks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parks.is_empty()
    }
}
