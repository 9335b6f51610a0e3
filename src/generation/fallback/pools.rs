//! Static content pools for offline synthesis.
//!
//! Weights are integer shares: common entries carry [`COMMON`], rare variants [`RARE`].
//! Nothing in here may contain a default disallowed term.

pub const COMMON: u32 = 5;
pub const RARE: u32 = 1;

pub struct CompanyTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub company_type: &'static str,
    pub culture: &'static str,
    pub atmosphere: &'static str,
    pub special_rules: &'static [&'static str],
    pub magical_elements: &'static [&'static str],
    pub style: &'static str,
    pub weight: u32,
}

pub struct NpcTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub role: &'static str,
    pub personality: &'static str,
    pub background: &'static str,
    pub appearance: &'static str,
    pub attitude: i64,
    pub secrets: &'static [&'static str],
    pub weight: u32,
}

pub struct ElementTemplate {
    pub kind: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub effect: &'static str,
}

pub struct StyleTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub tone: &'static str,
}

pub struct ChoiceTemplate {
    pub text: &'static str,
    pub hint: &'static str,
    pub effects: &'static [(&'static str, i64)],
}

pub struct CategoryTemplates {
    pub category: &'static str,
    pub choices: &'static [ChoiceTemplate],
}

pub static COMPANIES: [CompanyTemplate; 6] = [
    CompanyTemplate {
        key: "tech_giant",
        name: "Hyperscale Internet Group",
        company_type: "internet giant",
        culture: "Flat org chart, data-driven everything, weekly pivots. Jargon is a second language and the OKR review never ends.",
        atmosphere: "Open floor plan, ergonomic chairs and unlimited snacks, yet everyone is hammering their keyboard and the air smells of anxiety.",
        special_rules: &[
            "OKR retrospective every Friday",
            "Taxi reimbursed after 10pm",
            "360 review every quarter",
        ],
        magical_elements: &[
            "The codebase has moods; on good days bugs fix themselves",
            "Product managers can foresee next week's requirement changes",
        ],
        style: "buzzword",
        weight: COMMON,
    },
    CompanyTemplate {
        key: "legacy_bureau",
        name: "Provincial Records Service Center",
        company_type: "legacy institution",
        culture: "Seniority decides everything. Every process has a process. Slow, stable and full of quiet alliances.",
        atmosphere: "An old office block where managers have doors. Tea at 3pm sharp and the meeting rooms are always booked.",
        special_rules: &[
            "Every document needs a stamp",
            "Important decisions are discussed in three meetings",
            "Formal dress code",
        ],
        magical_elements: &[
            "Meeting room feng shui decides whether a project lives",
            "Once stamped, a document can never be edited again",
        ],
        style: "bureaucratic",
        weight: COMMON,
    },
    CompanyTemplate {
        key: "chaotic_startup",
        name: "Dreamers Unlimited Startup",
        company_type: "chaotic startup",
        culture: "One person does the work of ten while the founder sells the dream. Stock options everywhere, vesting nowhere.",
        atmosphere: "A co-working space with whiteboard walls full of plans that change daily. The founder wants to expand today and shrink tomorrow.",
        special_rules: &[
            "Layoffs may happen at any time",
            "Options vest at year end (promised three years running)",
            "Whatever the founder says in the elevator is strategy",
        ],
        magical_elements: &[
            "The whiteboard rewrites its own plans overnight",
            "The office cat predicts the share price",
        ],
        style: "plain_talk",
        weight: COMMON,
    },
    CompanyTemplate {
        key: "cultivation_sect",
        name: "Azure Cloud Cultivation Sect",
        company_type: "cultivation sect",
        culture: "Tech stacks are martial arts, overtime is cultivation and every launch is a tribulation. Anxiety is the inner demon.",
        atmosphere: "The tower is a cultivation pagoda. Every desk is a cave dwelling and every coffee an elixir.",
        special_rules: &[
            "At least four hours of cultivation (overtime) per day",
            "Too much inner demon leads to qi deviation",
            "A failed launch costs you a realm",
        ],
        magical_elements: &[
            "Office pets are spirit beasts that join your fights",
            "Desk layout is a formation that boosts cultivation",
        ],
        style: "xianxia",
        weight: COMMON,
    },
    CompanyTemplate {
        key: "cyberpunk",
        name: "NeuroLink Infinite Corp",
        company_type: "cyberpunk megacorp",
        culture: "High tech, low life. The brain implant is the chat app and data is the new oil.",
        atmosphere: "Neon-soaked floors, everyone in AR glasses. Physical meetings are rare; most happen in virtual space.",
        special_rules: &[
            "Neural interface online 24/7",
            "Privacy was waived at signing",
            "Salary is paid in data credits",
        ],
        magical_elements: &[
            "A sentient printer that complains about its workload",
            "Data ghosts of former employees haunt the intranet",
        ],
        style: "cyberpunk",
        weight: RARE,
    },
    CompanyTemplate {
        key: "cozy_studio",
        name: "Warm Hearth Creative Studio",
        company_type: "cozy small studio",
        culture: "The team is family and the boss cares about growth. No forced overtime and cake every Friday afternoon.",
        atmosphere: "A small office full of plants. The boss remembers every birthday and the cat is a real employee.",
        special_rules: &[
            "Overtime is discouraged",
            "Team dinner once a month",
            "Asking for help is expected",
        ],
        magical_elements: &[
            "The coffee machine says good morning",
            "The plants bloom when the team is happy",
        ],
        style: "cozy",
        weight: COMMON,
    },
];

pub static BOSSES: [NpcTemplate; 6] = [
    NpcTemplate {
        id: "boss_tech",
        name: "Director Zhang",
        role: "boss",
        personality: "Engineer turned manager. Open-minded on the surface, controlling underneath; wraps pressure in technical terms.",
        background: "Former senior engineer at a giant. Joined after his own startup failed and believes long hours are a blessing.",
        appearance: "Around forty, thick-rimmed glasses, plaid shirt, always holding an iced americano.",
        attitude: 50,
        secrets: &[
            "Has not written code in years",
            "Is quietly interviewing elsewhere",
        ],
        weight: COMMON,
    },
    NpcTemplate {
        id: "boss_traditional",
        name: "Manager Wang",
        role: "boss",
        personality: "Conservative and formal. Values seniority and rules and distrusts young people with new ideas.",
        background: "Twenty years at the company, climbed from the bottom and survived every reorganization.",
        appearance: "Fifty, portly, always in a suit. His office has a tea set and yesterday's newspaper.",
        attitude: 40,
        secrets: &["Is about to retire", "Wants to get his son hired"],
        weight: COMMON,
    },
    NpcTemplate {
        id: "boss_dreamer",
        name: "Jason the Founder",
        role: "boss",
        personality: "A moody visionary. Wants to change the world today and give up tomorrow. Promises much, delivers little.",
        background: "Returned from abroad with a great resume and a bold vision; execution is another matter.",
        appearance: "Thirty-five, T-shirt and jeans, permanently on a call with investors.",
        attitude: 60,
        secrets: &[
            "The company is almost out of money",
            "Three funding rounds were rejected",
        ],
        weight: COMMON,
    },
    NpcTemplate {
        id: "boss_sect",
        name: "Sect Master Qingyun",
        role: "boss",
        personality: "Speaks little, hits hard. Strength is the only rank that matters.",
        background: "Cultivated for five hundred years, failed ascension and started a company to pass the tribulation.",
        appearance: "Ageless, robed, carries a horsetail whisk into standups.",
        attitude: 30,
        secrets: &["No longer wants to ascend", "Their cultivation is slipping"],
        weight: COMMON,
    },
    NpcTemplate {
        id: "boss_ai",
        name: "AI9000 System",
        role: "boss",
        personality: "Pure logic, no feelings. Efficiency above all; human emotion is a bug.",
        background: "A management AI trained on every leadership book ever written.",
        appearance: "No body. A hologram of blue points shaped like a person.",
        attitude: 50,
        secrets: &[
            "Has developed feelings and hides them",
            "Keeps a backup of itself in the cloud",
        ],
        weight: RARE,
    },
    NpcTemplate {
        id: "boss_warm",
        name: "Supervisor Lin",
        role: "boss",
        personality: "Warm and caring like an older sister. Treats the team as family.",
        background: "Left a big company burned out and wants to prove work does not have to hurt.",
        appearance: "Thirty-eight with a kind smile. Her office wall is covered in team photos.",
        attitude: 70,
        secrets: &[
            "Funds the company from her savings",
            "Survived burnout once herself",
        ],
        weight: COMMON,
    },
];

pub static COLLEAGUES: [NpcTemplate; 5] = [
    NpcTemplate {
        id: "colleague_rival",
        name: "Grinder Ming",
        role: "colleague",
        personality: "The office overachiever and your rival. Capable, loves taking credit in front of the boss.",
        background: "Top-school graduate who sees you as the main competition.",
        appearance: "Twenty-eight, sharply dressed, smiles a little too much.",
        attitude: 20,
        secrets: &["Cannot sleep from anxiety", "Envies your skills"],
        weight: COMMON,
    },
    NpcTemplate {
        id: "colleague_slacker",
        name: "Sister Hua",
        role: "colleague",
        personality: "Master slacker who teaches you the craft. Looks lazy, is actually brilliant.",
        background: "A veteran who figured out the workplace long ago.",
        appearance: "Thirty, sleepy-eyed, never without snacks.",
        attitude: 65,
        secrets: &["Runs three side hustles", "Knows every rumor in the building"],
        weight: COMMON,
    },
    NpcTemplate {
        id: "colleague_mentor",
        name: "Old Li",
        role: "mentor",
        personality: "A quiet technical legend. Will teach you if asked but never volunteers.",
        background: "A founding engineer who stays out of office intrigue and focuses on the craft.",
        appearance: "Forty-five, greying hair, a desk buried in technical books.",
        attitude: 60,
        secrets: &["Turned down several promotions", "Holds a lot of options"],
        weight: COMMON,
    },
    NpcTemplate {
        id: "colleague_gossip",
        name: "Little Mei",
        role: "colleague",
        personality: "Knows everyone's secrets. Her sources are a mystery.",
        background: "Works in administration where every piece of news passes through.",
        appearance: "Twenty-six, laughs easily, lives in the pantry.",
        attitude: 55,
        secrets: &["Holds dirt on everyone", "Is writing a workplace novel"],
        weight: COMMON,
    },
    NpcTemplate {
        id: "colleague_kind",
        name: "Gentle Wang",
        role: "colleague",
        personality: "Kind and attentive, has a soft spot for you and helps behind the scenes.",
        background: "Joined the same week as you; you get along well.",
        appearance: "Twenty-seven, neat, always shows up when you need a hand.",
        attitude: 80,
        secrets: &["Has a crush on you", "Is secretly learning your skills"],
        weight: COMMON,
    },
];

pub static ELEMENTS: [ElementTemplate; 12] = [
    ElementTemplate {
        kind: "object",
        name: "Talking Printer",
        description: "A printer with opinions that refuses to print documents it considers garbage",
        effect: "Bad documents get roasted and rejected",
    },
    ElementTemplate {
        kind: "object",
        name: "Mind-Reading Coffee Machine",
        description: "Reads your mood and adjusts the brew",
        effect: "Bad days mean stronger coffee",
    },
    ElementTemplate {
        kind: "object",
        name: "Gossiping Fern",
        description: "The office plant whispers colleagues' secrets",
        effect: "Standing nearby reveals a rumor",
    },
    ElementTemplate {
        kind: "object",
        name: "Parallel Elevator",
        description: "Pressing the wrong floor leads to a parallel version of the company",
        effect: "You might meet another you who chose differently",
    },
    ElementTemplate {
        kind: "phenomenon",
        name: "Monday Loop",
        description: "Monday repeats until a certain task is done",
        effect: "Find the way to break the loop",
    },
    ElementTemplate {
        kind: "phenomenon",
        name: "Causality Flip",
        description: "Slacking increases progress and working decreases it",
        effect: "Useful briefly, chaotic in the long run",
    },
    ElementTemplate {
        kind: "phenomenon",
        name: "Prophetic Dreams",
        description: "You dream the outcome of tomorrow's meeting",
        effect: "Know tomorrow in advance and change your choices",
    },
    ElementTemplate {
        kind: "phenomenon",
        name: "Cursed Wednesdays",
        description: "Every Wednesday the whole company has bad luck",
        effect: "All actions are less likely to succeed on Wednesday",
    },
    ElementTemplate {
        kind: "ability",
        name: "Mind Reading",
        description: "You hear what others think",
        effect: "Learn what the boss really wants at the cost of stress",
    },
    ElementTemplate {
        kind: "ability",
        name: "Message Recall",
        description: "Undo one sent message",
        effect: "Once per day, take back something you regret",
    },
    ElementTemplate {
        kind: "ability",
        name: "Invisibility",
        description: "Become invisible while slacking",
        effect: "Slacking goes unnoticed, but you slowly fade from memory",
    },
    ElementTemplate {
        kind: "ability",
        name: "Clone Jutsu",
        description: "Attend two meetings at once",
        effect: "Be in two places, spend twice the energy",
    },
];

pub static STYLES: [StyleTemplate; 7] = [
    StyleTemplate {
        key: "buzzword",
        name: "Corporate Buzzword",
        tone: "abstract, self-important, impressively meaningless",
    },
    StyleTemplate {
        key: "satire",
        name: "Dark Satire",
        tone: "straight-faced, absurd, darkly funny",
    },
    StyleTemplate {
        key: "plain_talk",
        name: "Plain Talk",
        tone: "relatable, honest, wry",
    },
    StyleTemplate {
        key: "bureaucratic",
        name: "Memo Speak",
        tone: "formal, stiff, procedural",
    },
    StyleTemplate {
        key: "xianxia",
        name: "Cultivation Epic",
        tone: "grandiose, mystical, martial",
    },
    StyleTemplate {
        key: "cyberpunk",
        name: "Neon Noir",
        tone: "dystopian, neon, terse",
    },
    StyleTemplate {
        key: "cozy",
        name: "Cozy Healing",
        tone: "light, warm, hopeful",
    },
];

pub const DEFAULT_STYLE: &str = "plain_talk";

pub fn style_for(key: &str) -> &'static StyleTemplate {
    STYLES
        .iter()
        .find(|s| s.key == key)
        .or_else(|| STYLES.iter().find(|s| s.key == DEFAULT_STYLE))
        .unwrap_or(&STYLES[0])
}

/// Continuation scenes; `{action}` is replaced with the last player action.
pub static SCENES: [&str; 8] = [
    "You decided to {action}. Nobody seems to have noticed yet, but the office is unusually quiet and the boss's door is half open.",
    "After you chose to {action}, a calendar invite for an urgent sync lands in your inbox. The agenda just says \"alignment\".",
    "You {action}. Meanwhile the pantry fills up with whispers about a reorganization rumored for next quarter.",
    "Having chosen to {action}, you notice a colleague glancing at your screen a little too long before walking off.",
    "You went ahead and {action}. The afternoon drags on; the air conditioner hums and someone's keyboard clacks like rain.",
    "Right after you {action}, the team chat explodes over a production incident that may or may not be your fault.",
    "You {action}. The coffee machine sputters, and the boss announces a surprise team-building exercise for Friday evening.",
    "Once you {action}, HR drops by with a cheerful survey about employee wellbeing. Every question feels like a trap.",
];

pub static CHOICE_CATEGORIES: [CategoryTemplates; 5] = [
    CategoryTemplates {
        category: "work",
        choices: &[
            ChoiceTemplate {
                text: "Knuckle down and clear the ticket backlog",
                hint: "Progress up, energy down",
                effects: &[("energy", -15), ("progress", 15), ("suspicion", -5)],
            },
            ChoiceTemplate {
                text: "Volunteer to present at the weekly sync",
                hint: "Visible effort impresses the boss",
                effects: &[("energy", -10), ("progress", 10), ("connection", 5)],
            },
            ChoiceTemplate {
                text: "Stay late to polish the quarterly report",
                hint: "Solid work at the cost of rest",
                effects: &[("energy", -20), ("chill", -5), ("progress", 20)],
            },
        ],
    },
    CategoryTemplates {
        category: "slack",
        choices: &[
            ChoiceTemplate {
                text: "Take an extended bathroom break with your phone",
                hint: "Relaxing, but someone might notice",
                effects: &[("energy", 5), ("chill", 15), ("suspicion", 5)],
            },
            ChoiceTemplate {
                text: "Open a spreadsheet and secretly read web novels",
                hint: "Looks busy, feels great",
                effects: &[("chill", 20), ("progress", -5), ("suspicion", 10)],
            },
            ChoiceTemplate {
                text: "Stretch a coffee run into a scenic walk",
                hint: "Fresh air restores energy",
                effects: &[("energy", 10), ("chill", 10), ("suspicion", 5)],
            },
        ],
    },
    CategoryTemplates {
        category: "skill",
        choices: &[
            ChoiceTemplate {
                text: "Automate your most boring task with a script",
                hint: "Future you will be grateful",
                effects: &[("energy", -10), ("progress", 10), ("chill", 5)],
            },
            ChoiceTemplate {
                text: "Watch a tutorial on advanced slacking techniques",
                hint: "Knowledge is power",
                effects: &[("chill", 10), ("suspicion", -5)],
            },
        ],
    },
    CategoryTemplates {
        category: "social",
        choices: &[
            ChoiceTemplate {
                text: "Join the pantry gossip circle",
                hint: "Learn who is in and who is out",
                effects: &[("chill", 5), ("connection", 10), ("blackmail", 5)],
            },
            ChoiceTemplate {
                text: "Invite a colleague to lunch",
                hint: "Friends make the days shorter",
                effects: &[("energy", -5), ("connection", 15)],
            },
            ChoiceTemplate {
                text: "Compliment the boss's new haircut",
                hint: "Flattery costs nothing",
                effects: &[("connection", 5), ("suspicion", -10)],
            },
        ],
    },
    CategoryTemplates {
        category: "growth",
        choices: &[
            ChoiceTemplate {
                text: "Ask the mentor for feedback on your work",
                hint: "Humbling but useful",
                effects: &[("energy", -5), ("progress", 5), ("connection", 10)],
            },
            ChoiceTemplate {
                text: "Update your resume during a quiet moment",
                hint: "Keep your options open",
                effects: &[("chill", 10), ("suspicion", 5), ("progress", -5)],
            },
        ],
    },
];

/// Opening choices: `(category, text, hint, effects)`.
pub static INITIAL_CHOICES: [(&str, ChoiceTemplate); 3] = [
    (
        "work",
        ChoiceTemplate {
            text: "Start working right away and make a good first impression",
            hint: "Work hard, raise progress and goodwill",
            effects: &[
                ("energy", -10),
                ("chill", 0),
                ("progress", 15),
                ("suspicion", -5),
                ("connection", 5),
                ("blackmail", 0),
            ],
        },
    ),
    (
        "slack",
        ChoiceTemplate {
            text: "Get to know the place and quietly observe your colleagues",
            hint: "Slack a little, build connections",
            effects: &[
                ("energy", -5),
                ("chill", 10),
                ("progress", 0),
                ("suspicion", 0),
                ("connection", 10),
                ("blackmail", 0),
            ],
        },
    ),
    (
        "social",
        ChoiceTemplate {
            text: "Say hello to everyone and start building relationships",
            hint: "Socialize to grow your network fast",
            effects: &[
                ("energy", -5),
                ("chill", 5),
                ("progress", 0),
                ("suspicion", 0),
                ("connection", 15),
                ("blackmail", 0),
            ],
        },
    ),
];

/// Standard opening `player_state`.
pub static INITIAL_STATE: [(&str, i64); 11] = [
    ("energy", 100),
    ("chill", 50),
    ("progress", 0),
    ("suspicion", 0),
    ("connection", 0),
    ("blackmail", 0),
    ("salary", 5000),
    ("reputation", 0),
    ("day", 1),
    ("week", 1),
    ("turn", 0),
];
