use serde::{Deserialize, Serialize};

/// Member of the company, listed on the artists page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub role: String,
    pub bio: String,
    pub image: String,
    pub achievements: Vec<String>,
    pub experience: String,
    pub location: String,
    /// Audience rating out of 5.
    pub rating: f64,
    pub total_shows: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ArtistRoster {
    artists: Vec<Artist>,
}

impl ArtistRoster {
    pub fn new(artists: Vec<Artist>) -> Self {
        Self { artists }
    }

    pub fn with_defaults() -> Self {
        Self::new(default_artists())
    }

    pub fn list(&self) -> &[Artist] {
        &self.artists
    }

    pub fn get(&self, id: &str) -> Option<&Artist> {
        self.artists.iter().find(|a| a.id == id)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn default_artists() -> Vec<Artist> {
    vec![
        Artist {
            id: "1".into(),
            name: "Sarah Nakimuli".into(),
            role: "Lead Actress & Director".into(),
            bio: "Sarah is a celebrated actress and director with over 15 years of experience in Ugandan theatre. She has been instrumental in preserving traditional Ugandan storytelling while incorporating modern theatrical techniques.".into(),
            image: "https://images.pexels.com/photos/1239291/pexels-photo-1239291.jpeg".into(),
            achievements: strings(&["Best Actress Award 2023", "Cultural Ambassador", "Theatre Director of the Year"]),
            experience: "15+ years".into(),
            location: "Kampala, Uganda".into(),
            rating: 4.9,
            total_shows: 85,
        },
        Artist {
            id: "2".into(),
            name: "David Mukasa".into(),
            role: "Musical Director & Composer".into(),
            bio: "David is a talented musician and composer who blends traditional Ugandan music with contemporary sounds. His compositions have become synonymous with Uganda National Theatre productions.".into(),
            image: "https://images.pexels.com/photos/1222271/pexels-photo-1222271.jpeg".into(),
            achievements: strings(&["Best Original Score 2024", "Traditional Music Preservation Award", "Grammy Nomination"]),
            experience: "12+ years".into(),
            location: "Kampala, Uganda".into(),
            rating: 4.8,
            total_shows: 67,
        },
        Artist {
            id: "3".into(),
            name: "Grace Namatovu".into(),
            role: "Choreographer & Dance Director".into(),
            bio: "Grace is a master of traditional Ugandan dance forms and has choreographed numerous award-winning productions. She leads our dance troupe and teaches traditional dance to young artists.".into(),
            image: "https://images.pexels.com/photos/1121796/pexels-photo-1121796.jpeg".into(),
            achievements: strings(&["Choreographer of the Year", "Cultural Heritage Award", "International Dance Festival Winner"]),
            experience: "18+ years".into(),
            location: "Kampala, Uganda".into(),
            rating: 4.9,
            total_shows: 92,
        },
        Artist {
            id: "4".into(),
            name: "Michael Ssemakula".into(),
            role: "Actor & Voice Coach".into(),
            bio: "Michael is known for his powerful stage presence and distinctive voice. He has starred in numerous productions and now mentors the next generation of Ugandan actors.".into(),
            image: "https://images.pexels.com/photos/1043471/pexels-photo-1043471.jpeg".into(),
            achievements: strings(&["Best Supporting Actor", "Voice Excellence Award", "Theatre Mentor Award"]),
            experience: "10+ years".into(),
            location: "Kampala, Uganda".into(),
            rating: 4.7,
            total_shows: 54,
        },
        Artist {
            id: "5".into(),
            name: "Ruth Kisakye".into(),
            role: "Costume Designer & Cultural Consultant".into(),
            bio: "Ruth specializes in creating authentic traditional costumes and ensuring cultural accuracy in all productions. Her designs have been featured in international theatre festivals.".into(),
            image: "https://images.pexels.com/photos/1065084/pexels-photo-1065084.jpeg".into(),
            achievements: strings(&["Best Costume Design", "Cultural Authenticity Award", "International Design Recognition"]),
            experience: "14+ years".into(),
            location: "Kampala, Uganda".into(),
            rating: 4.8,
            total_shows: 78,
        },
        Artist {
            id: "6".into(),
            name: "James Kiwanuka".into(),
            role: "Set Designer & Technical Director".into(),
            bio: "James brings stories to life through innovative set designs that blend traditional Ugandan aesthetics with modern theatrical technology. His work has transformed the theatre experience.".into(),
            image: "https://images.pexels.com/photos/1374510/pexels-photo-1374510.jpeg".into(),
            achievements: strings(&["Best Set Design Award", "Technical Innovation Prize", "Sustainability in Theatre Award"]),
            experience: "11+ years".into(),
            location: "Kampala, Uganda".into(),
            rating: 4.6,
            total_shows: 43,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roster() {
        let roster = ArtistRoster::with_defaults();
        assert_eq!(roster.list().len(), 6);

        let grace = roster.get("3").unwrap();
        assert_eq!(grace.name, "Grace Namatovu");
        assert_eq!(grace.total_shows, 92);
        assert_eq!(grace.achievements.len(), 3);
        assert!(roster.get("7").is_none());

        assert!(roster.list().iter().all(|a| (0.0..=5.0).contains(&a.rating)));
    }
}
